// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Helper functions to compute the routing header.
//!
//! Services shard requests using the `x-goog-request-params` header. Its
//! value is a list of `key=value` pairs, joined by `&`, where each value is
//! extracted from a request field, optionally matching a path template.

use http::HeaderValue;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The name of the routing header.
pub const ROUTING_HEADER: &str = "x-goog-request-params";

// Unreserved characters in RFC 3986 are left as-is.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A segment in a (decomposed) path template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    /// Matches exactly the given text.
    Literal(&'static str),
    /// Matches one or more characters, stopping at the next `/`.
    SingleWildcard,
    /// Matches one or more characters, including `/`.
    MultiWildcard,
}

/// Find a routing parameter in `haystack` using the (decomposed) template.
///
/// # Example
/// ```
/// # use aiplatform_gax_internal::routing_parameter::*;
/// use Segment::{Literal, SingleWildcard, MultiWildcard};
/// let matching = find_matching(
///     "projects/p/locations/l/endpoints/e",
///     &[Literal("projects/"), SingleWildcard, Literal("/")],
///     &[Literal("locations/"), SingleWildcard],
///     &[Literal("/endpoints/"), MultiWildcard]);
/// assert_eq!(matching, Some("locations/l"));
/// ```
///
/// # Parameters
/// - `haystack` - a string where to find the path template.
/// - `prefix` - the initial segments in the template that must match,
///   and are not included in the result.
/// - `matching` - the segments in the template that must match and **are**
///   included in the result.
/// - `suffix` - the trailing segments in the template that must match, and
///   are not included in the result.
pub fn find_matching<'h>(
    haystack: &'h str,
    prefix: &[Segment],
    matching: &[Segment],
    suffix: &[Segment],
) -> Option<&'h str> {
    let mut remains = haystack;
    let mut start = 0_usize;
    let mut end = 0_usize;

    for segment in prefix {
        let count = consume(remains, segment)?;
        start += count;
        end += count;
        remains = &remains[count..];
    }
    for segment in matching {
        let count = consume(remains, segment)?;
        end += count;
        remains = &remains[count..];
    }
    for segment in suffix {
        let count = consume(remains, segment)?;
        remains = &remains[count..];
    }
    if !remains.is_empty() || start == end {
        return None;
    }
    Some(&haystack[start..end])
}

/// Like [find_matching], but skips missing fields.
pub fn value<'h>(
    haystack: Option<&'h str>,
    prefix: &[Segment],
    matching: &[Segment],
    suffix: &[Segment],
) -> Option<&'h str> {
    haystack.and_then(|h| find_matching(h, prefix, matching, suffix))
}

fn consume(remains: &str, segment: &Segment) -> Option<usize> {
    match segment {
        Segment::Literal(p) => remains.starts_with(p).then_some(p.len()),
        Segment::SingleWildcard => {
            let i = remains.find('/').unwrap_or(remains.len());
            (i != 0).then_some(i)
        }
        Segment::MultiWildcard => {
            let i = remains.len();
            (i != 0).then_some(i)
        }
    }
}

/// Format a routing parameter key value pair.
pub fn format((k, v): (&str, &str)) -> String {
    format!("{k}={}", utf8_percent_encode(v, ENCODE_SET))
}

/// Formats all the pairs, skipping empty values.
///
/// Returns `None` if there are no pairs to send.
pub fn format_all<'a, I>(pairs: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut i = pairs.into_iter().filter(|(_, v)| !v.is_empty());
    let s = i.next().map(format)?;
    Some(i.fold(s, |s, p| s + "&" + &format(p)))
}

/// Formats the pairs as a header value.
pub fn header_value<'a, I>(pairs: I) -> Option<HeaderValue>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    // The value is percent-encoded, so it is always a valid header value.
    format_all(pairs).and_then(|s| HeaderValue::from_str(&s).ok())
}

#[cfg(test)]
mod tests {
    use super::Segment::{Literal, MultiWildcard, SingleWildcard};
    use super::*;
    use test_case::test_case;

    const ENDPOINT: &str = "projects/p/locations/us-central1/endpoints/e";

    struct Request {
        endpoint: String,
        model: Option<String>,
    }

    // Each method produces something like this. The last match wins, so the
    // templates are tried in reverse order.
    fn request_params(req: &Request) -> Option<String> {
        let params = [
            find_matching(
                &req.endpoint,
                &[Literal("projects/"), SingleWildcard, Literal("/")],
                &[Literal("locations/"), SingleWildcard],
                &[Literal("/"), MultiWildcard],
            )
            .map(|v| ("location", v)),
            value(req.model.as_deref(), &[], &[MultiWildcard], &[]).map(|v| ("model", v)),
        ];
        format_all(params.into_iter().flatten())
    }

    #[test_case("", None, None; "empty")]
    #[test_case(ENDPOINT, None, Some("location=locations%2Fus-central1"); "location only")]
    #[test_case("", Some("m"), Some("model=m"); "model only")]
    #[test_case(ENDPOINT, Some("models/m"), Some("location=locations%2Fus-central1&model=models%2Fm"); "both")]
    fn simulated_request(endpoint: &str, model: Option<&str>, want: Option<&str>) {
        let got = request_params(&Request {
            endpoint: endpoint.into(),
            model: model.map(str::to_string),
        });
        assert_eq!(got.as_deref(), want);
    }

    #[test_case("", None; "empty")]
    #[test_case("projects/p/locations/l/endpoints/e", Some("locations/l"); "success")]
    #[test_case("projects/p/locations/l/endpoints/e/extra", None; "too much suffix")]
    #[test_case("extra/projects/p/locations/l/endpoints/e", None; "too much prefix")]
    #[test_case("projects/p/locations//endpoints/e", None; "empty match")]
    #[test_case("projects/p/l/endpoints/e", None; "missing keyword")]
    #[test_case("projects/p/locations/l", None; "missing suffix")]
    fn single_matches(input: &str, want: Option<&str>) {
        let got = find_matching(
            input,
            &[Literal("projects/"), SingleWildcard, Literal("/")],
            &[Literal("locations/"), SingleWildcard],
            &[Literal("/endpoints/"), SingleWildcard],
        );
        assert_eq!(got, want);
    }

    #[test_case("", None; "empty")]
    #[test_case("projects/p/locations/l/endpoints/e", Some("locations/l/endpoints/e"); "success")]
    #[test_case("projects/p/locations/l/endpoints/e/extra", Some("locations/l/endpoints/e/extra"); "with extra")]
    #[test_case("projects/p/locations/l/endpoints", None; "missing separator")]
    #[test_case("projects/p/locations/l/endpoints/", None; "empty segment")]
    fn matching_multi_segment(input: &str, want: Option<&str>) {
        let got = find_matching(
            input,
            &[Literal("projects/"), SingleWildcard, Literal("/")],
            &[
                Literal("locations/"),
                SingleWildcard,
                Literal("/endpoints/"),
                MultiWildcard,
            ],
            &[],
        );
        assert_eq!(got, want);
    }

    #[test]
    fn value_skips_missing() {
        assert_eq!(value(None, &[], &[MultiWildcard], &[]), None);
        assert_eq!(value(Some("abc"), &[], &[MultiWildcard], &[]), Some("abc"));
    }

    #[test_case("endpoint_value", "endpoint=endpoint_value")]
    #[test_case("a b", "endpoint=a%20b")]
    #[test_case("a&b=c", "endpoint=a%26b%3Dc")]
    #[test_case("ünicode", "endpoint=%C3%BCnicode")]
    fn format_encodes(input: &str, want: &str) {
        assert_eq!(format(("endpoint", input)), want);
    }

    #[test]
    fn header() {
        let got = header_value([("endpoint", "endpoint_value"), ("model", "")]);
        assert_eq!(got, Some(HeaderValue::from_static("endpoint=endpoint_value")));
        let got = header_value([("endpoint", "")]);
        assert_eq!(got, None);
    }
}

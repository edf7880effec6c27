use crate::configuration::manifest::{Expectation, SelectorEntry, TextMatch};
use crate::harness::error::Error;
use bytes::Bytes;
use http::Response as HttpResponse;
use lazy_static::*;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref TITLE_REGEX: Regex =
        Regex::new(r"(?is)<title[^>]*>(?P<title>.*?)</title>").expect("Regex compilation error");
}

pub trait Assertable<T> {
    fn assert(&self, data: &T) -> Result<(), Error>;
}

/// A response together with how long it took to arrive.
#[derive(Debug)]
pub struct Exchange {
    response: HttpResponse<Bytes>,
    text: String,
    elapsed: Duration,
}

impl Exchange {
    pub fn new(response: HttpResponse<Bytes>, elapsed: Duration) -> Self {
        let text = String::from_utf8_lossy(response.body()).into_owned();
        Self {
            response,
            text,
            elapsed,
        }
    }

    #[inline]
    pub fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    pub fn title(&self) -> Option<String> {
        TITLE_REGEX
            .captures(&self.text)
            .map(|caps| caps["title"].trim().to_owned())
    }
}

fn mismatch(message: String) -> Result<(), Error> {
    Err(Error::AssertionMismatch(message))
}

impl Assertable<Exchange> for Expectation {
    fn assert(&self, data: &Exchange) -> Result<(), Error> {
        trace!("Asserting {:?}", self);
        match self {
            Expectation::Status(range) => {
                if range.contains(data.status()) {
                    Ok(())
                } else {
                    mismatch(format!("expected status {}, got {}", range, data.status()))
                }
            }
            Expectation::Contains(needle) => {
                if data.text().contains(needle.as_str()) {
                    Ok(())
                } else {
                    mismatch(format!("body does not contain {:?}", needle))
                }
            }
            Expectation::NotContains(needle) => {
                if data.text().contains(needle.as_str()) {
                    mismatch(format!("body unexpectedly contains {:?}", needle))
                } else {
                    Ok(())
                }
            }
            Expectation::AnyOf(needles) => {
                if needles.iter().any(|needle| data.text().contains(needle.as_str())) {
                    Ok(())
                } else {
                    let listed: Vec<String> =
                        needles.iter().map(|needle| format!("{:?}", needle)).collect();
                    mismatch(format!("body contains none of {}", listed.join(", ")))
                }
            }
            Expectation::Matches(regex) => {
                if regex.is_match(data.text()) {
                    Ok(())
                } else {
                    mismatch(format!("body does not match /{}/", regex.as_str()))
                }
            }
            Expectation::Title(expected) => match (data.title(), expected) {
                (None, _) => mismatch("page has no <title>".to_owned()),
                (Some(title), TextMatch::Equals(wanted)) if &title != wanted => {
                    mismatch(format!("title is {:?}, expected {:?}", title, wanted))
                }
                (Some(title), TextMatch::Contains(wanted)) if !title.contains(wanted.as_str()) => {
                    mismatch(format!("title {:?} does not contain {:?}", title, wanted))
                }
                _ => Ok(()),
            },
            Expectation::Header { name, value } => match (data.header(name), value) {
                (None, _) => mismatch(format!("header {:?} is missing", name)),
                (Some(actual), Some(wanted)) if &actual != wanted => mismatch(format!(
                    "header {:?} is {:?}, expected {:?}",
                    name, actual, wanted
                )),
                _ => Ok(()),
            },
            Expectation::NoHeader(name) => match data.header(name) {
                Some(actual) => mismatch(format!("header {:?} is present ({:?})", name, actual)),
                None => Ok(()),
            },
            Expectation::MaxDuration(limit) => {
                if data.elapsed() <= *limit {
                    Ok(())
                } else {
                    mismatch(format!(
                        "response took {}ms, limit {}ms",
                        data.elapsed().as_millis(),
                        limit.as_millis()
                    ))
                }
            }
            Expectation::Unreachable => mismatch(format!(
                "expected the request to fail, got status {}",
                data.status()
            )),
        }
    }
}

/// `data` holds the text of every node the selector matched.
impl Assertable<Vec<String>> for SelectorEntry {
    fn assert(&self, data: &Vec<String>) -> Result<(), Error> {
        if data.len() < self.min {
            return mismatch(format!(
                "selector {:?} matched {} node(s), expected at least {}",
                self.css,
                data.len(),
                self.min
            ));
        }
        match &self.text {
            Some(wanted) if !data.iter().any(|text| text.contains(wanted.as_str())) => {
                mismatch(format!(
                    "no node matching {:?} contains {:?}",
                    self.css, wanted
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::configuration::manifest::StatusRange;

    fn exchange(status: u16, headers: &[(&str, &str)], body: &str) -> Exchange {
        let mut builder = HttpResponse::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Exchange::new(
            builder.body(Bytes::from(body.to_owned())).unwrap(),
            Duration::from_millis(120),
        )
    }

    const PAGE: &str = r#"<!doctype html><html><head>
        <meta name="viewport" content="width=device-width">
        <title>
          智语拆解 StoryWeaver AI
        </title></head><body><input type="file"></body></html>"#;

    fn message(result: Result<(), Error>) -> String {
        match result {
            Err(Error::AssertionMismatch(message)) => message,
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_title_is_extracted_and_trimmed() {
        assert_eq!(
            exchange(200, &[], PAGE).title().as_deref(),
            Some("智语拆解 StoryWeaver AI")
        );
        assert_eq!(exchange(200, &[], "<p>no title</p>").title(), None);
    }

    #[test]
    fn test_title_contains() {
        let page = exchange(200, &[], PAGE);
        let present = Expectation::Title(TextMatch::Contains("StoryWeaver".to_owned()));
        let absent = Expectation::Title(TextMatch::Contains("需求拆解".to_owned()));

        assert!(present.assert(&page).is_ok());
        assert!(message(absent.assert(&page)).contains("需求拆解"));
    }

    #[test]
    fn test_title_equals() {
        let page = exchange(200, &[], PAGE);
        assert!(Expectation::Title(TextMatch::Equals("智语拆解 StoryWeaver AI".to_owned()))
            .assert(&page)
            .is_ok());
        assert!(Expectation::Title(TextMatch::Equals("StoryWeaver".to_owned()))
            .assert(&page)
            .is_err());
    }

    #[test]
    fn test_status_range() {
        let expectation = Expectation::Status(StatusRange::default());
        assert!(expectation.assert(&exchange(302, &[], "")).is_ok());
        assert_eq!(
            message(expectation.assert(&exchange(404, &[], ""))),
            "expected status 200-399, got 404"
        );
    }

    #[test]
    fn test_body_substrings() {
        let page = exchange(200, &[], PAGE);
        assert!(Expectation::Contains("<input type=\"file\"".to_owned())
            .assert(&page)
            .is_ok());
        assert_eq!(
            message(Expectation::Contains("选择文件".to_owned()).assert(&page)),
            "body does not contain \"选择文件\""
        );
        assert!(Expectation::NotContains("Not Found".to_owned())
            .assert(&page)
            .is_ok());
        assert!(
            Expectation::AnyOf(vec!["container".to_owned(), "viewport".to_owned()])
                .assert(&page)
                .is_ok()
        );
        assert!(
            message(Expectation::AnyOf(vec!["grid".to_owned(), "flex".to_owned()]).assert(&page))
                .contains("\"grid\", \"flex\"")
        );
        assert!(Expectation::Matches(Regex::new(r#"<meta name="viewport""#).unwrap())
            .assert(&page)
            .is_ok());
    }

    #[test]
    fn test_headers() {
        let page = exchange(200, &[("Content-Type", "text/html; charset=utf-8")], "");
        let header = |name: &str, value: Option<&str>| Expectation::Header {
            name: name.to_owned(),
            value: value.map(str::to_owned),
        };

        assert!(header("content-type", None).assert(&page).is_ok());
        assert!(header("content-type", Some("text/html; charset=utf-8"))
            .assert(&page)
            .is_ok());
        assert!(header("content-type", Some("application/json"))
            .assert(&page)
            .is_err());
        assert_eq!(
            message(header("x-frame-options", None).assert(&page)),
            "header \"x-frame-options\" is missing"
        );
        assert!(Expectation::NoHeader("server".to_owned()).assert(&page).is_ok());
        assert!(Expectation::NoHeader("content-type".to_owned())
            .assert(&page)
            .is_err());
    }

    #[test]
    fn test_timing_and_reachability() {
        let page = exchange(200, &[], "");
        assert!(Expectation::MaxDuration(Duration::from_millis(500))
            .assert(&page)
            .is_ok());
        assert_eq!(
            message(Expectation::MaxDuration(Duration::from_millis(100)).assert(&page)),
            "response took 120ms, limit 100ms"
        );
        assert!(Expectation::Unreachable.assert(&page).is_err());
    }

    #[test]
    fn test_selectors() {
        let tabs = vec!["上传".to_owned(), "故事".to_owned(), "配置".to_owned()];
        let selector = |min: usize, text: Option<&str>| SelectorEntry {
            css: "[role=tab]".to_owned(),
            min,
            text: text.map(str::to_owned),
        };

        assert!(selector(3, None).assert(&tabs).is_ok());
        assert!(selector(1, Some("故事")).assert(&tabs).is_ok());
        assert!(selector(4, None).assert(&tabs).is_err());
        assert!(message(selector(1, Some("地图")).assert(&tabs)).contains("地图"));
    }
}

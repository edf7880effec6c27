use serde_derive::Deserialize;

/// Manifest scalars may arrive as numbers or strings depending on the source
/// format and on whether they were overridden from the environment.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(value) => value.to_string(),
            NumberOrText::Text(text) => text,
        }
    }
}

pub mod duration {
    use super::NumberOrText;
    use crate::time::DurationUnit;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let literal = NumberOrText::deserialize(deserializer)?.into_text();
        literal
            .parse::<DurationUnit>()
            .and_then(|unit| unit.duration())
            .map_err(|err| D::Error::custom(err.to_string()))
    }
}

pub mod http_method {
    use reqwest::Method;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::str::FromStr;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Method::from_str(name.to_uppercase().as_str())
            .map_err(|_| D::Error::custom(format!("invalid http method '{}'", name)))
    }
}

pub mod status_range {
    use super::NumberOrText;
    use crate::configuration::manifest::StatusRange;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<StatusRange, D::Error>
    where
        D: Deserializer<'de>,
    {
        NumberOrText::deserialize(deserializer)?
            .into_text()
            .parse::<StatusRange>()
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::configuration::manifest::StatusRange;
    use reqwest::Method;
    use serde_derive::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(with = "super::duration")]
        timeout: Duration,
        #[serde(with = "super::http_method")]
        method: Method,
        #[serde(with = "super::status_range")]
        status: StatusRange,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let probe: Probe =
            serde_json::from_value(json!({ "timeout": 250, "method": "post", "status": 201 }))
                .unwrap();
        assert_eq!(probe.timeout, Duration::from_millis(250));
        assert_eq!(probe.method, Method::POST);
        assert_eq!(probe.status, StatusRange::new(201, 201));

        let probe: Probe =
            serde_json::from_value(json!({ "timeout": "2s", "method": "GET", "status": "2xx" }))
                .unwrap();
        assert_eq!(probe.timeout, Duration::from_secs(2));
        assert_eq!(probe.status, StatusRange::new(200, 299));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let result = serde_json::from_value::<Probe>(
            json!({ "timeout": "whenever", "method": "GET", "status": 200 }),
        );
        assert!(result.is_err());
    }
}

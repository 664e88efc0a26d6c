//! ECMAScript editions and the feature categories tied to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ECMAScript edition, totally ordered by release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum EsVersion {
    #[default]
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    ES2021,
    ES2022,
}

impl EsVersion {
    pub const ALL: [EsVersion; 9] = [
        EsVersion::ES5,
        EsVersion::ES2015,
        EsVersion::ES2016,
        EsVersion::ES2017,
        EsVersion::ES2018,
        EsVersion::ES2019,
        EsVersion::ES2020,
        EsVersion::ES2021,
        EsVersion::ES2022,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EsVersion::ES5 => "ES5",
            EsVersion::ES2015 => "ES2015",
            EsVersion::ES2016 => "ES2016",
            EsVersion::ES2017 => "ES2017",
            EsVersion::ES2018 => "ES2018",
            EsVersion::ES2019 => "ES2019",
            EsVersion::ES2020 => "ES2020",
            EsVersion::ES2021 => "ES2021",
            EsVersion::ES2022 => "ES2022",
        }
    }

    /// Highest of `versions`, or ES5 when empty.
    pub fn max_of(versions: impl IntoIterator<Item = EsVersion>) -> EsVersion {
        versions.into_iter().max().unwrap_or_default()
    }
}

impl fmt::Display for EsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EsVersion::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ECMAScript version: {s}"))
    }
}

/// A named syntax feature and the edition that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
    pub version: EsVersion,
    pub name: String,
}

impl Category {
    pub fn new(version: EsVersion, name: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
        }
    }
}

/// Formats as `version:name`, e.g. `ES2015:for-of`.
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_of_empty_is_es5() {
        assert_eq!(EsVersion::max_of([]), EsVersion::ES5);
    }

    #[test]
    fn test_max_of_single_is_itself() {
        for version in EsVersion::ALL {
            assert_eq!(EsVersion::max_of([version]), version);
        }
        assert_eq!(
            EsVersion::max_of([EsVersion::ES2017, EsVersion::ES2015, EsVersion::ES2020]),
            EsVersion::ES2020
        );
    }

    #[test]
    fn test_version_order_and_names() {
        assert!(EsVersion::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!("es2019".parse::<EsVersion>().unwrap(), EsVersion::ES2019);
        assert!("ES2023".parse::<EsVersion>().is_err());
        assert_eq!(serde_json::to_string(&EsVersion::ES2021).unwrap(), "\"ES2021\"");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::new(EsVersion::ES2015, "for-of").to_string(), "ES2015:for-of");
    }
}

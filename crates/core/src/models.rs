use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

/// A blog post discovered in the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Path relative to the posts directory, without extension.
    pub slug: String,
    pub data: PostMeta,
    /// Markdown source following the frontmatter block.
    pub body: String,
}

/// Post frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "date_format")]
    pub publish_date: Date,
    #[serde(default, with = "date_format::option", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

impl PostMeta {
    /// The date shown for the post: the last update if any, otherwise publication.
    pub fn display_date(&self) -> Date { self.updated_date.unwrap_or(self.publish_date) }

    /// A custom preview image suppresses generation. Empty values count as unset.
    pub fn has_og_image(&self) -> bool { self.og_image.as_deref().is_some_and(|s| !s.is_empty()) }
}

/// Parse a frontmatter date, either `YYYY-MM-DD` or an RFC 3339 datetime.
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    let value = value.trim();
    match Date::parse(value, format_description!("[year]-[month]-[day]")) {
        Ok(date) => Ok(date),
        Err(_) => OffsetDateTime::parse(value, &Rfc3339).map(|dt| dt.date()),
    }
}

mod date_format {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use time::{Date, macros::format_description};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        let value = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|e| <S::Error as serde::ser::Error>::custom(e.to_string()))?;
        serializer.serialize_str(&value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where D: Deserializer<'de> {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(|e| D::Error::custom(format!("invalid date {value:?}: {e}")))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de::Error};
        use time::Date;

        pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where D: Deserializer<'de> {
            match Option::<String>::deserialize(deserializer)? {
                Some(value) => crate::models::parse_date(&value)
                    .map(Some)
                    .map_err(|e| D::Error::custom(format!("invalid date {value:?}: {e}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-05").unwrap(), date!(2024 - 03 - 05));
        assert_eq!(parse_date("2024-03-05T23:10:00Z").unwrap(), date!(2024 - 03 - 05));
        assert_eq!(parse_date(" 2024-03-05T10:00:00+09:00 ").unwrap(), date!(2024 - 03 - 05));
        assert!(parse_date("March 5").is_err());
    }

    #[test]
    fn test_frontmatter() {
        let meta: PostMeta = serde_yaml::from_str(
            "title: Hello\ndescription: World\npublishDate: 2024-03-05\nupdatedDate: \"2024-04-01\"\n",
        )
        .unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.publish_date, date!(2024 - 03 - 05));
        assert_eq!(meta.display_date(), date!(2024 - 04 - 01));
        assert!(!meta.has_og_image());
        assert!(meta.tags.is_empty());
        assert!(!meta.draft);
    }

    #[test]
    fn test_display_date_without_update() {
        let meta: PostMeta = serde_yaml::from_str("publishDate: 2024-03-05\nogImage: x.png").unwrap();
        assert_eq!(meta.display_date(), date!(2024 - 03 - 05));
        assert!(meta.has_og_image());
        assert_eq!(meta.title, "");
    }

    #[test]
    fn test_empty_og_image() {
        let meta: PostMeta = serde_yaml::from_str("publishDate: 2024-03-05\nogImage: ''").unwrap();
        assert!(!meta.has_og_image());
    }
}

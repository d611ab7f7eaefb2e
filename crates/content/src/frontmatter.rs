use anyhow::{Result, anyhow};
use folio_core::models::PostMeta;

/// Split a leading `---` delimited YAML block from the markdown body.
pub fn split(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let body = &rest[offset + line.len()..];
            return Some((&rest[..offset], body));
        }
        offset += line.len();
    }
    None
}

pub fn parse(source: &str) -> Result<(PostMeta, &str)> {
    let (yaml, body) = split(source).ok_or_else(|| anyhow!("Missing frontmatter"))?;
    let meta = serde_yaml::from_str(yaml)?;
    Ok((meta, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let cases: &[(&str, Option<(&str, &str)>)] = &[
            ("---\ntitle: a\n---\nbody\n", Some(("title: a\n", "body\n"))),
            ("---\r\ntitle: a\r\n---\r\nbody", Some(("title: a\r\n", "body"))),
            ("\u{feff}---\n---\n", Some(("", ""))),
            ("---\ntitle: a\n", None),
            ("title: a\n---\n", None),
            ("----\n---\n", None),
        ];
        for &(source, expected) in cases {
            assert_eq!(split(source), expected, "{source:?}");
        }
    }

    #[test]
    fn test_parse() {
        let (meta, body) = parse(
            "---\ntitle: \"Hello: world\"\ndescription: Intro\npublishDate: 2024-03-05\ntags: [rust]\n---\n# Hi\n",
        )
        .unwrap();
        assert_eq!(meta.title, "Hello: world");
        assert_eq!(meta.tags, vec!["rust".to_string()]);
        assert_eq!(body, "# Hi\n");
        assert!(parse("# no frontmatter").is_err());
        assert!(parse("---\ntitle: missing date\n---\n").is_err());
    }
}

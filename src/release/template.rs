//! Announcement texts with `{placeholder}` substitution

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::{Captures, Regex};

use crate::error::{Result, SrtError};

/// Announcement of a final release, printed for the maintainer to mail
pub const ANNOUNCE_TEMPLATE: &str = include_str!("../../templates/announce-srt.txt");

/// Cover letter blurb of a release candidate review series
pub const RC_TEMPLATE: &str = include_str!("../../templates/announce-srt-rc.txt");

pub type Replacements<'a> = BTreeMap<&'a str, String>;

/// Replace every `{name}` in `template` by its value.
///
/// A placeholder without a value is an error so that a typo in a custom
/// template never goes out in a mail.
pub fn render(template: &str, replacements: &Replacements) -> Result<String> {
    let re = Regex::new(r"\{([a-z_]+)\}").map_err(|e| SrtError::template(e.to_string()))?;

    if let Some(missing) = re
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| !replacements.contains_key(name.as_str()))
    {
        return Err(SrtError::template(format!("unknown placeholder {{{}}}", missing)));
    }

    Ok(re
        .replace_all(template, |caps: &Captures| {
            replacements
                .get(&caps[1])
                .cloned()
                .unwrap_or_default()
        })
        .into_owned())
}

/// Template text from `path` if configured, else `default`
pub fn load(path: Option<&Path>, default: &str) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut r = Replacements::new();
        r.insert("name", "Mighty Eagle".to_string());
        r.insert("new_version", "4.4.116-rt39".to_string());
        assert_eq!(
            render("{new_version} is out. {name}\n", &r).unwrap(),
            "4.4.116-rt39 is out. Mighty Eagle\n"
        );
    }

    #[test]
    fn test_render_unknown_placeholder() {
        let r = Replacements::new();
        let err = render("Dear {nmae}", &r).unwrap_err();
        assert!(matches!(err, SrtError::Template(_)));
        assert!(err.to_string().contains("{nmae}"));
    }

    #[test]
    fn test_render_leaves_other_braces() {
        let r = Replacements::new();
        assert_eq!(render("v4.4^{} {A}", &r).unwrap(), "v4.4^{} {A}");
    }

    #[test]
    fn test_default_templates_render() {
        let keys = [
            "mail_to", "major", "minor", "patch", "new_version", "old_version", "prj_dir",
            "message_id", "sender", "name", "new_tag_rt", "new_tag_rc", "release_date", "date",
            "branch_name", "branch_head",
        ];
        let r: Replacements = keys.iter().map(|k| (*k, "x".to_string())).collect();
        assert!(render(ANNOUNCE_TEMPLATE, &r).is_ok());
        assert!(render(RC_TEMPLATE, &r).is_ok());
    }

    #[test]
    fn test_load_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("announce.txt");
        fs::write(&path, "custom {name}").unwrap();
        assert_eq!(load(Some(&path), ANNOUNCE_TEMPLATE).unwrap(), "custom {name}");
        assert_eq!(load(None, "default").unwrap(), "default");
    }
}

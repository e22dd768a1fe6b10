//! Remote path templates
//!
//! Remote directory and file names are configured as templates containing
//! `{name}` tokens. Values are captured once per upload so that both templates
//! expand against the same timestamp.

use chrono::NaiveDateTime;

/// Token values for one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    vars: Vec<(&'static str, String)>,
}

impl TemplateVars {
    /// Capture date/time components, the source file stem and its content hash
    pub fn snapshot(now: NaiveDateTime, filename: &str, md5: &str) -> Self {
        let vars = vec![
            ("year", now.format("%Y").to_string()),
            ("month", now.format("%m").to_string()),
            ("day", now.format("%d").to_string()),
            ("hour", now.format("%H").to_string()),
            ("minute", now.format("%M").to_string()),
            ("second", now.format("%S").to_string()),
            ("filename", filename.to_string()),
            ("md5", md5.to_string()),
        ];
        Self { vars }
    }

    /// Look up a token value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace every known `{token}` in `template`; unknown tokens are kept verbatim.
    ///
    /// Substituted values are never re-scanned.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            match after.find(|c| c == '}' || c == '{') {
                Some(close) if after.as_bytes()[close] == b'}' => {
                    let name = &after[..close];
                    match self.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                // Stray `{` with no matching close before the next `{`
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Join a remote directory and file name with `/`, the way object keys are written
pub fn join_key(dir: &str, file: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(file.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Build the full object key from the two templates and the source extension
///
/// `extension` includes its leading dot, or is empty.
pub fn expand_remote_key(
    remote_path: &str,
    remote_name: &str,
    vars: &TemplateVars,
    extension: &str,
) -> String {
    let dir = vars.expand(remote_path);
    let name = format!("{}{}", vars.expand(remote_name), extension);
    join_key(&dir, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_expand_known_tokens() {
        let vars = TemplateVars::snapshot(at(2024, 3, 7, 9, 5, 1), "foo", "abc123");
        assert_eq!(vars.expand("{year}/{filename}-{md5}"), "2024/foo-abc123");
        assert_eq!(
            vars.expand("{year}{month}{day}-{hour}{minute}{second}"),
            "20240307-090501"
        );
    }

    #[test]
    fn test_expand_repeated_and_unknown_tokens() {
        let vars = TemplateVars::snapshot(at(2024, 1, 1, 0, 0, 0), "foo", "abc123");
        assert_eq!(vars.expand("{md5}/{md5}"), "abc123/abc123");
        assert_eq!(vars.expand("{bogus}/{filename}"), "{bogus}/foo");
        assert_eq!(vars.expand("{ {year} }"), "{ 2024 }");
        assert_eq!(vars.expand("plain"), "plain");
        assert_eq!(vars.expand("{year"), "{year");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let vars = TemplateVars::snapshot(at(2024, 1, 1, 0, 0, 0), "{md5}", "abc");
        assert_eq!(vars.expand("{filename}"), "{md5}");
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("2024/01", "a.png"), "2024/01/a.png");
        assert_eq!(join_key("2024/01/", "a.png"), "2024/01/a.png");
        assert_eq!(join_key("", "a.png"), "a.png");
        assert_eq!(join_key("./img//x", "a.png"), "img/x/a.png");
    }

    #[test]
    fn test_join_key_resolves_parent_segments() {
        assert_eq!(join_key("img/..", "a.png"), "a.png");
        assert_eq!(join_key("blog/2024/../img", "a.png"), "blog/img/a.png");
        // Keys can not climb above the bucket root
        assert_eq!(join_key("../..", "a.png"), "a.png");
    }

    #[test]
    fn test_expand_remote_key_appends_extension() {
        let vars = TemplateVars::snapshot(at(2024, 12, 31, 23, 59, 58), "shot", "d41d8c");
        assert_eq!(
            expand_remote_key("blog/{year}/{month}", "{filename}-{md5}", &vars, ".png"),
            "blog/2024/12/shot-d41d8c.png"
        );
        assert_eq!(expand_remote_key("", "{filename}", &vars, ""), "shot");
    }
}

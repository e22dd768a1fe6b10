//! Markdown snippets inserted into the document

use chrono::NaiveDateTime;

/// `![name](url)`
pub fn markdown_image(name: &str, url: &str) -> String {
    format!("![{}]({})", name, url)
}

/// File name for a fresh clipboard capture, e.g. `20240307090501.png`
pub fn paste_file_name(now: NaiveDateTime) -> String {
    format!("{}.png", now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_markdown_image() {
        assert_eq!(
            markdown_image("", "https://img.example.com/a.png"),
            "![](https://img.example.com/a.png)"
        );
    }

    #[test]
    fn test_paste_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(paste_file_name(now), "20240307090501.png");
    }
}

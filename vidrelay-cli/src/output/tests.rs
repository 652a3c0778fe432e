//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::StreamHead;
    use super::super::text::TextFormatter;
    use vidrelay_core::detect_source;
    use vidrelay_providers::ProviderRegistry;

    #[test]
    fn test_format_source_without_colors() {
        let formatter = TextFormatter::new(false);
        let reference = detect_source("https://vidmoly.me/w/abc123");
        let text = formatter.format_source(&reference);
        assert!(text.contains("Vidmoly (vidmoly)"));
        assert!(text.contains("abc123"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_unknown_source_is_red() {
        let formatter = TextFormatter::new(true);
        let text = formatter.format_source(&detect_source("hello"));
        assert!(text.contains("\x1b[31mUnknown"));
    }

    #[test]
    fn test_provider_line_names_resolver() {
        let formatter = TextFormatter::new(false);
        let drive = &ProviderRegistry::all()[0];
        let line = formatter.format_provider_line(drive);
        assert!(line.contains("google-drive"));
        assert!(line.contains("built-in"));
        assert!(line.contains("google-drive.cascade"));
    }

    #[test]
    fn test_stream_head_lists_headers() {
        let formatter = TextFormatter::new(false);
        let head = StreamHead::new(206, vec![("content-type".into(), "video/mp4".into())]);
        assert_eq!(
            formatter.format_stream_head(&head),
            "Status: 206\n  content-type: video/mp4"
        );
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{JsonFormatter, StreamHead};
    use vidrelay_providers::ProviderRegistry;

    #[test]
    fn test_providers_json_shape() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format_providers(ProviderRegistry::all()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let list = value.as_array().unwrap();
        assert_eq!(list.len(), ProviderRegistry::count());
        assert_eq!(list[0]["provider"], "google-drive");
        assert_eq!(list[0]["mode"], "built-in");

        let voe = list.iter().find(|p| p["provider"] == "voe").unwrap();
        assert_eq!(voe["mode"], "backend");
        assert!(voe.get("resolver").is_none());
    }

    #[test]
    fn test_stream_head_json() {
        let formatter = JsonFormatter::new(false);
        let head = StreamHead::new(200, vec![("accept-ranges".into(), "bytes".into())]);
        assert_eq!(
            formatter.format(&head).unwrap(),
            r#"{"status":200,"headers":[["accept-ranges","bytes"]]}"#
        );
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let formatter = JsonFormatter::new(true);
        let head = StreamHead::new(200, Vec::new());
        assert!(formatter.format(&head).unwrap().contains('\n'));
    }
}

use regex::Regex;
use scraper::{Html, Selector};

use crate::result::ContainerRecord;

/// Substring that marks a script or iframe as GTM plumbing. Matched
/// case-sensitively: the loader snippet always spells the domain in
/// lowercase.
const GTM_MARKER: &str = "googletagmanager";

/// Finds GTM containers in a parsed document and classifies their placement.
///
/// A standard installation has two halves: the loader `<script>` in the
/// document head and a `<noscript><iframe>` fallback in the body. Both are
/// located here with the selectors and the `GTM-XXXXXXX` id pattern, never by
/// executing anything. Pure function of the document, so it can be exercised
/// without any network.
pub struct ContainerDetector {
    head_scripts: Selector,
    noscript_iframes: Selector,
    container_id: Regex,
}

impl ContainerDetector {
    pub fn new() -> Self {
        Self {
            head_scripts: Selector::parse("head script").unwrap(),
            noscript_iframes: Selector::parse(r#"body noscript iframe[src*="googletagmanager"]"#)
                .unwrap(),
            container_id: Regex::new(r"GTM-[A-Z0-9]+").expect("container id pattern is valid"),
        }
    }

    /// One record per distinct container id, in first-seen order (head scan
    /// first, then body scan). An empty vec means the page has no GTM wiring
    /// at all.
    pub fn detect(&self, document: &Html) -> Vec<ContainerRecord> {
        let mut head_ids: Vec<String> = Vec::new();
        let mut body_ids: Vec<String> = Vec::new();
        let mut all_ids: Vec<String> = Vec::new();

        for script in document.select(&self.head_scripts) {
            let markup = script.html();
            if !markup.contains(GTM_MARKER) {
                continue;
            }
            if let Some(id) = self.first_container_id(&markup) {
                push_unique(&mut head_ids, &id);
                push_unique(&mut all_ids, &id);
            }
        }

        for iframe in document.select(&self.noscript_iframes) {
            if let Some(id) = self.first_container_id(&iframe.html()) {
                push_unique(&mut body_ids, &id);
                push_unique(&mut all_ids, &id);
            }
        }

        all_ids
            .into_iter()
            .map(|id| ContainerRecord {
                in_head: head_ids.contains(&id),
                in_body: body_ids.contains(&id),
                id,
            })
            .collect()
    }

    fn first_container_id(&self, markup: &str) -> Option<String> {
        self.container_id
            .find(markup)
            .map(|m| m.as_str().to_string())
    }
}

impl Default for ContainerDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|seen| seen == id) {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(html: &str) -> Vec<ContainerRecord> {
        ContainerDetector::new().detect(&Html::parse_document(html))
    }

    fn head_snippet(id: &str) -> String {
        format!(
            "<script>(function(w,d,s,l,i){{w[l]=w[l]||[];}})\
             (window,document,'script','dataLayer','{id}');\
             // https://www.googletagmanager.com/gtm.js</script>"
        )
    }

    fn body_snippet(id: &str) -> String {
        format!(
            r#"<noscript><iframe src="https://www.googletagmanager.com/ns.html?id={id}"
               height="0" width="0" style="display:none;visibility:hidden"></iframe></noscript>"#
        )
    }

    #[test]
    fn test_head_and_body_placements_are_classified_separately() {
        let html = format!(
            "<html><head>{}</head><body>{}</body></html>",
            head_snippet("GTM-ABC123"),
            body_snippet("GTM-XYZ999"),
        );
        let records = detect(&html);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "GTM-ABC123");
        assert!(records[0].in_head);
        assert!(!records[0].in_body);
        assert_eq!(records[1].id, "GTM-XYZ999");
        assert!(!records[1].in_head);
        assert!(records[1].in_body);
    }

    #[test]
    fn test_same_id_in_both_placements_yields_one_record() {
        let html = format!(
            "<html><head>{}</head><body>{}</body></html>",
            head_snippet("GTM-BOTH01"),
            body_snippet("GTM-BOTH01"),
        );
        let records = detect(&html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "GTM-BOTH01");
        assert!(records[0].in_head);
        assert!(records[0].in_body);
    }

    #[test]
    fn test_page_without_containers_yields_empty_list() {
        let html = "<html><head><script>console.log('hi')</script></head>\
                    <body><p>nothing here</p></body></html>";
        assert!(detect(html).is_empty());
    }

    #[test]
    fn test_head_script_without_gtm_marker_is_ignored() {
        // The id pattern alone is not enough; the script must mention the
        // googletagmanager domain.
        let html = "<html><head><script>var x = 'GTM-FAKE01';</script></head>\
                    <body></body></html>";
        assert!(detect(html).is_empty());
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        let html = "<html><head><script>load('GoogleTagManager.com/gtm.js?id=GTM-UPPER1')\
                    </script></head><body></body></html>";
        assert!(detect(html).is_empty());
    }

    #[test]
    fn test_body_iframe_outside_noscript_is_ignored() {
        let html = r#"<html><head></head><body>
            <iframe src="https://www.googletagmanager.com/ns.html?id=GTM-LOOSE1"></iframe>
            </body></html>"#;
        assert!(detect(html).is_empty());
    }

    #[test]
    fn test_duplicate_head_scripts_dedupe_to_one_record() {
        let html = format!(
            "<html><head>{}{}</head><body></body></html>",
            head_snippet("GTM-DUPE01"),
            head_snippet("GTM-DUPE01"),
        );
        let records = detect(&html);

        assert_eq!(records.len(), 1);
        assert!(records[0].in_head);
        assert!(!records[0].in_body);
    }

    #[test]
    fn test_union_order_is_head_scan_then_body_scan() {
        let html = format!(
            "<html><head>{}{}</head><body>{}{}</body></html>",
            head_snippet("GTM-FIRST1"),
            head_snippet("GTM-SECOND"),
            body_snippet("GTM-THIRD1"),
            body_snippet("GTM-FIRST1"),
        );
        let ids: Vec<_> = detect(&html).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["GTM-FIRST1", "GTM-SECOND", "GTM-THIRD1"]);
    }

    #[test]
    fn test_first_id_match_per_element_wins() {
        let html = "<html><head><script>\
                    // googletagmanager loader for GTM-MAIN01, mirrors GTM-SHADOW\
                    </script></head><body></body></html>";
        let records = detect(html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "GTM-MAIN01");
    }
}

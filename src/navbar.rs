//! Server-rendered navigation header fragment.

/// Sticky top bar with a title and an optional back control.
///
/// The back control hands a single `history.back()` call to the browser per
/// activation and ignores the outcome. Rendering is deterministic in the
/// inputs and has no other effect.
pub struct NavBar {
    title: String,
    show_back: bool,
}

impl NavBar {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            show_back: true,
        }
    }

    pub fn show_back(mut self, show_back: bool) -> Self {
        self.show_back = show_back;
        self
    }

    pub fn render(&self) -> String {
        let mut bar = String::new();

        bar += "<nav class=\"app-navbar\" style=\"position: sticky; top: 0\">\n";
        if self.show_back {
            bar += "  <button class=\"back\" onclick=\"history.back()\">&#8249; Zur\u{fc}ck</button>\n";
        }
        bar += &format!("  <span class=\"title\">{}</span>\n", escape_html(&self.title));
        bar += "</nav>\n";

        bar
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

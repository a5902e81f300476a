//! HTML bodies for the account emails. Each builder returns `(subject, html)`.

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif\">\
         <h2>{title}</h2>{body}<p>The Mealhub team</p></body></html>"
    )
}

#[must_use]
pub fn verify_email(name: &str, link: &str) -> (String, String) {
    let link = escape(link);
    let body = format!(
        "<p>Hi {},</p><p>Thanks for signing up. Confirm your email address to \
         activate your account:</p><p><a href=\"{link}\">{link}</a></p>\
         <p>The link expires in one hour.</p>",
        escape(name)
    );
    (
        "Verify your email".to_string(),
        layout("Verify your email", &body),
    )
}

#[must_use]
pub fn email_verified(name: &str) -> (String, String) {
    let body = format!(
        "<p>Hi {},</p><p>Your email address has been verified. You can now log in.</p>",
        escape(name)
    );
    (
        "Email verified".to_string(),
        layout("Email verified", &body),
    )
}

#[must_use]
pub fn password_reset(name: &str, link: &str) -> (String, String) {
    let link = escape(link);
    let body = format!(
        "<p>Hi {},</p><p>We received a request to reset your password. \
         Choose a new one here:</p><p><a href=\"{link}\">{link}</a></p>\
         <p>If you did not ask for this, ignore this email.</p>",
        escape(name)
    );
    (
        "Reset your password".to_string(),
        layout("Reset your password", &body),
    )
}

#[must_use]
pub fn password_changed(name: &str) -> (String, String) {
    let body = format!(
        "<p>Hi {},</p><p>Your password was just changed. If this was not you, \
         reset your password immediately.</p>",
        escape(name)
    );
    (
        "Your password was changed".to_string(),
        layout("Password changed", &body),
    )
}

/// A blog post as a newsletter. Line breaks in the content become paragraphs.
#[must_use]
pub fn blog_post(title: &str, content: &str, image_url: &str) -> (String, String) {
    let paragraphs: String = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect();
    let body = format!(
        "<p><img src=\"{}\" alt=\"{}\" style=\"max-width:100%\"/></p>{paragraphs}",
        escape(image_url),
        escape(title)
    );
    (title.to_string(), layout(&escape(title), &body))
}

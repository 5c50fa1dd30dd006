//! Reminder email rendering

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use duebell_domain::constants::APP_DISPLAY_NAME;
use duebell_domain::{DuebellError, Notification, Result};

use super::eligibility::Candidate;

const ACCENT: &str = "#2563eb";

/// Renders the reminder email for an eligible task.
#[derive(Debug, Clone)]
pub struct ReminderRenderer {
    from: String,
    timezone: Tz,
    app_url: String,
}

impl ReminderRenderer {
    /// Build a renderer. `timezone` is an IANA zone name used to print due
    /// dates.
    ///
    /// # Errors
    ///
    /// Returns `DuebellError::Config` if the zone name is unknown.
    pub fn new(
        from: impl Into<String>,
        timezone: &str,
        app_url: impl Into<String>,
    ) -> Result<Self> {
        let timezone = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| DuebellError::Config(format!("unknown display timezone: {timezone}")))?;

        Ok(Self { from: from.into(), timezone, app_url: app_url.into() })
    }

    pub fn subject(title: &str) -> String {
        format!("⏰ Reminder: Task \"{title}\" is due soon!")
    }

    /// Due date as shown to the recipient, e.g. `2025-01-15 10:30 CET`.
    pub fn format_due(&self, due_at: DateTime<Utc>) -> String {
        due_at.with_timezone(&self.timezone).format("%Y-%m-%d %H:%M %Z").to_string()
    }

    pub fn render(&self, candidate: &Candidate) -> Notification {
        Notification {
            to: candidate.recipient.clone(),
            from: self.from.clone(),
            subject: Self::subject(&candidate.task.title),
            html: self.html_body(candidate),
            text: self.text_body(candidate),
        }
    }

    fn html_body(&self, candidate: &Candidate) -> String {
        let task = &candidate.task;
        let mut html = String::with_capacity(1_536);

        let _ = write!(
            html,
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: auto; \
             border: 1px solid #e0e0e0; border-radius: 8px; overflow: hidden;\">\
             <div style=\"background: {ACCENT}; color: #fff; padding: 20px 30px;\">\
             <h2 style=\"margin: 0;\">⏰ Task Reminder</h2></div>\
             <div style=\"padding: 24px 30px; background: #fafbfc;\">\
             <p style=\"font-size: 16px;\">Hi <b>{name}</b>,</p>\
             <p style=\"font-size: 16px;\">This is a friendly reminder that your task \
             <b>\"{title}\"</b> is due soon!</p>\
             <ul style=\"font-size: 15px; color: #333;\">\
             <li><b>Due Date:</b> {due}</li>\
             <li><b>Priority:</b> {priority}</li>\
             <li><b>Status:</b> {status}</li></ul>",
            name = escape_html(candidate.owner.greeting_name()),
            title = escape_html(&task.title),
            due = escape_html(&self.format_due(candidate.due_at)),
            priority = task.priority,
            status = task.status,
        );

        if let Some(description) = task.description_text() {
            let _ = write!(
                html,
                "<p style=\"margin-top: 10px;\"><b>Description:</b> {}</p>",
                escape_html(description)
            );
        }

        let _ = write!(
            html,
            "<div style=\"margin-top: 24px;\"><a href=\"{url}\" style=\"background: {ACCENT}; \
             color: #fff; padding: 10px 18px; border-radius: 4px; text-decoration: none; \
             font-weight: bold;\">Go to {app}</a></div>\
             <p style=\"margin-top: 32px; color: #888; font-size: 13px;\">Please complete your \
             task before the deadline.<br/>Best regards,<br/>{app} Team</p></div></div>",
            url = escape_html(&self.app_url),
            app = APP_DISPLAY_NAME,
        );

        html
    }

    fn text_body(&self, candidate: &Candidate) -> String {
        let task = &candidate.task;
        let mut text = String::with_capacity(512);

        let _ = writeln!(text, "Hi {},", candidate.owner.greeting_name());
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "This is a friendly reminder that your task \"{}\" is due soon!",
            task.title
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "Due Date: {}", self.format_due(candidate.due_at));
        let _ = writeln!(text, "Priority: {}", task.priority);
        let _ = writeln!(text, "Status: {}", task.status);
        if let Some(description) = task.description_text() {
            let _ = writeln!(text, "Description: {description}");
        }
        let _ = writeln!(text);
        let _ = writeln!(text, "Go to {APP_DISPLAY_NAME}: {}", self.app_url);
        let _ = writeln!(text);
        let _ = writeln!(text, "Please complete your task before the deadline.");
        let _ = writeln!(text, "Best regards,");
        let _ = write!(text, "{APP_DISPLAY_NAME} Team");

        text
    }
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use duebell_domain::{Priority, Task, TaskStatus, User};

    use super::*;

    fn candidate(title: &str, description: Option<&str>) -> Candidate {
        let due_at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        let owner = User {
            id: "u1".into(),
            email: Some("a@x.com".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
        };
        Candidate {
            task: Task {
                id: "t1".into(),
                title: title.into(),
                description: description.map(str::to_string),
                priority: Priority::High,
                due_date: Some(due_at.to_rfc3339()),
                status: TaskStatus::InProgress,
                owner_id: "u1".into(),
                owner: Some(owner.clone()),
            },
            owner,
            due_at,
            recipient: "a@x.com".into(),
        }
    }

    fn renderer(tz: &str) -> ReminderRenderer {
        ReminderRenderer::new("noreply@todo.app", tz, "http://localhost/todos").unwrap()
    }

    #[test]
    fn renders_subject_and_recipient() {
        let notification = renderer("UTC").render(&candidate("Pay rent", None));

        assert_eq!(notification.to, "a@x.com");
        assert_eq!(notification.from, "noreply@todo.app");
        assert_eq!(notification.subject, "⏰ Reminder: Task \"Pay rent\" is due soon!");
        assert!(notification.html.contains("Hi <b>Ada</b>"));
        assert!(notification.html.contains("<b>Priority:</b> High"));
        assert!(notification.html.contains("<b>Status:</b> In Progress"));
        assert!(notification.html.contains("2025-01-15 10:30 UTC"));
        assert!(notification.html.contains("href=\"http://localhost/todos\""));
        assert!(!notification.html.contains("Description:"));
        assert!(notification.text.contains("\"Pay rent\" is due soon!"));
    }

    #[test]
    fn escapes_user_supplied_text() {
        let notification =
            renderer("UTC").render(&candidate("<script>x</script>", Some("Tom & \"Jerry\"")));

        assert!(!notification.html.contains("<script>"));
        assert!(notification.html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(notification.html.contains("Tom &amp; &quot;Jerry&quot;"));
        assert!(notification.text.contains("Description: Tom & \"Jerry\""));
    }

    #[test]
    fn formats_due_date_in_display_zone() {
        let due = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(renderer("Europe/Berlin").format_due(due), "2025-01-15 11:30 CET");
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = ReminderRenderer::new("a@x.com", "Mars/Olympus", "http://x").unwrap_err();
        assert!(matches!(err, DuebellError::Config(_)));
    }
}

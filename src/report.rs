//! Report Rendering Module
//!
//! Renders a [`DiagnosticReport`] as a self-contained HTML page: an
//! environment card, a database connection card with success or failure
//! banner, the employee count, and a bounded sample table. The page is a
//! human-facing diagnostic, not an API; its markup carries no stability
//! contract.

use chrono::Utc;

use crate::probe::{ConnectionStatus, DiagnosticReport};

const STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";

/// Renders the full diagnostic page.
pub fn render(report: &DiagnosticReport) -> String {
    let mut page = String::with_capacity(4096);

    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("    <meta charset=\"UTF-8\">\n");
    page.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    page.push_str(&format!(
        "    <title>System Check - {}</title>\n",
        escape(&report.app_name)
    ));
    page.push_str(&format!(
        "    <link rel=\"stylesheet\" href=\"{}\">\n",
        STYLESHEET
    ));
    page.push_str("    <style>\n");
    page.push_str("        .success { color: #28a745; }\n");
    page.push_str("        .error { color: #dc3545; }\n");
    page.push_str("    </style>\n</head>\n<body>\n");
    page.push_str("    <div class=\"container my-5\">\n");
    page.push_str("        <h1 class=\"text-center mb-4\">&#128295; System Check</h1>\n");

    render_environment_card(report, &mut page);
    render_connection_card(report, &mut page);

    page.push_str(&format!(
        "        <p class=\"text-muted mt-4\">Generated at {} (configured timezone: {})</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        escape(&report.timezone)
    ));
    page.push_str("    </div>\n</body>\n</html>\n");
    page
}

fn render_environment_card(report: &DiagnosticReport, page: &mut String) {
    page.push_str("        <div class=\"card\">\n            <div class=\"card-body\">\n");
    page.push_str("                <h3>Environment</h3>\n");
    page.push_str("                <ul class=\"list-group list-group-flush\">\n");
    page.push_str(&format!(
        "                    <li class=\"list-group-item\"><strong>Application:</strong> {} v{}</li>\n",
        escape(&report.app_name),
        escape(&report.app_version)
    ));
    page.push_str(&format!(
        "                    <li class=\"list-group-item\"><strong>Database Driver:</strong> <span class=\"success\">{} &#9989; Available</span></li>\n",
        escape(report.driver)
    ));
    page.push_str("                </ul>\n            </div>\n        </div>\n");
}

fn render_connection_card(report: &DiagnosticReport, page: &mut String) {
    page.push_str("        <div class=\"card mt-4\">\n            <div class=\"card-body\">\n");
    page.push_str("                <h3>Database Connection</h3>\n");

    match &report.connection {
        ConnectionStatus::Connected {
            host,
            database,
            user,
        } => {
            page.push_str("                <div class=\"alert alert-success\">\n");
            page.push_str(
                "                    <h4>&#9989; Database Connection Successful!</h4>\n",
            );
            page.push_str("                    <ul>\n");
            page.push_str(&format!(
                "                        <li><strong>Host:</strong> {}</li>\n",
                escape(host)
            ));
            page.push_str(&format!(
                "                        <li><strong>Database:</strong> {}</li>\n",
                escape(database)
            ));
            page.push_str(&format!(
                "                        <li><strong>User:</strong> {}</li>\n",
                escape(user)
            ));
            render_version_line(report, page);
            page.push_str("                    </ul>\n                </div>\n");

            render_database_status(report, page);
        }
        ConnectionStatus::Failed { message } => {
            page.push_str("                <div class=\"alert alert-danger\">\n");
            page.push_str("                    <h4>&#10060; Database Connection Failed!</h4>\n");
            page.push_str(&format!(
                "                    <p><strong>Error:</strong> {}</p>\n",
                escape(message)
            ));
            render_troubleshooting(page);
            page.push_str("                </div>\n");
        }
    }

    page.push_str("            </div>\n        </div>\n");
}

fn render_version_line(report: &DiagnosticReport, page: &mut String) {
    if let Some(check) = &report.server_version {
        let (class, verdict) = if check.ok {
            ("success", "&#9989;".to_string())
        } else {
            ("error", format!("&#10060; (Requires {}+)", check.minimum))
        };
        page.push_str(&format!(
            "                        <li><strong>Server Version:</strong> <span class=\"{}\">{} {}</span></li>\n",
            class,
            escape(&check.reported),
            verdict
        ));
    }
}

fn render_database_status(report: &DiagnosticReport, page: &mut String) {
    if let Some(count) = report.employee_count {
        page.push_str("                <div class=\"alert alert-info\">\n");
        page.push_str("                    <strong>&#128202; Database Status:</strong><br>\n");
        page.push_str(&format!(
            "                    Total employees in database: <strong>{}</strong>\n",
            count
        ));
        page.push_str("                </div>\n");

        if !report.sample_rows.is_empty() {
            page.push_str("                <h4>Sample Data:</h4>\n");
            page.push_str("                <table class=\"table table-striped\">\n");
            page.push_str("                    <thead><tr><th>ID</th><th>Name</th><th>Email</th></tr></thead>\n");
            page.push_str("                    <tbody>\n");
            for row in &report.sample_rows {
                page.push_str(&format!(
                    "                        <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    row.id,
                    escape(&row.name),
                    escape(&row.email)
                ));
            }
            page.push_str("                    </tbody>\n                </table>\n");
        }
    }

    if let Some(message) = &report.query_error {
        page.push_str("                <div class=\"alert alert-danger\">\n");
        page.push_str("                    <h4>&#10060; Diagnostic Query Failed!</h4>\n");
        page.push_str(&format!(
            "                    <p><strong>Error:</strong> {}</p>\n",
            escape(message)
        ));
        render_troubleshooting(page);
        page.push_str("                </div>\n");
    }
}

fn render_troubleshooting(page: &mut String) {
    page.push_str("                    <h5>Troubleshooting Steps:</h5>\n");
    page.push_str("                    <ol>\n");
    page.push_str("                        <li>Check if MySQL is running</li>\n");
    page.push_str("                        <li>Verify the database credentials</li>\n");
    page.push_str("                        <li>Ensure the configured database exists</li>\n");
    page.push_str(
        "                        <li>Run: <code>mysql -u root -p &lt; database/schema.sql</code></li>\n",
    );
    page.push_str("                    </ol>\n");
}

/// Escapes a value for safe interpolation into HTML text and attributes.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

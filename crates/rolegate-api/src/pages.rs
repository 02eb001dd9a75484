//! Minimal HTML pages

use axum::response::Html;
use rolegate_core::Principal;

use crate::csrf::CSRF_FIELD;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

fn csrf_input(token: Option<&str>) -> String {
    token
        .map(|t| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                CSRF_FIELD,
                escape(t)
            )
        })
        .unwrap_or_default()
}

pub fn login(error: bool, remember_me_parameter: &str, csrf: Option<&str>) -> Html<String> {
    let banner = if error {
        "<p class=\"error\">Invalid username or password</p>\n"
    } else {
        ""
    };
    let body = format!(
        "<h1>Sign in</h1>\n{banner}<form method=\"post\" action=\"/login/account\">\n\
         <label>Username <input type=\"text\" name=\"username\"></label>\n\
         <label>Password <input type=\"password\" name=\"password\"></label>\n\
         <label><input type=\"checkbox\" name=\"{remember}\"> Remember me</label>\n\
         {csrf}\n<button type=\"submit\">Sign in</button>\n</form>",
        banner = banner,
        remember = escape(remember_me_parameter),
        csrf = csrf_input(csrf),
    );
    layout("Sign in", &body)
}

pub fn welcome(principal: &Principal) -> Html<String> {
    let roles = principal
        .roles
        .iter()
        .map(|r| escape(r.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let body = format!(
        "<h1>Welcome, {}</h1>\n<p>Roles: {}</p>\n<p><a href=\"/logout/page\">Sign out</a></p>",
        escape(&principal.username),
        roles
    );
    layout("Welcome", &body)
}

pub fn logout(csrf: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Sign out</h1>\n<form method=\"post\" action=\"/logout/page\">\n{}\n\
         <button type=\"submit\">Sign out</button>\n</form>",
        csrf_input(csrf)
    );
    layout("Sign out", &body)
}

pub fn logout_result() -> Html<String> {
    layout(
        "Signed out",
        "<h1>You have been signed out</h1>\n<p><a href=\"/login/page\">Sign in again</a></p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::AuthMethod;
    use rolegate_directory::{Role, User};

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_login_page_fields() {
        let Html(page) = login(true, "remember-me", Some("tok"));
        assert!(page.contains("name=\"username\""));
        assert!(page.contains("name=\"password\""));
        assert!(page.contains("name=\"remember-me\""));
        assert!(page.contains("name=\"_csrf\" value=\"tok\""));
        assert!(page.contains("Invalid username or password"));

        let Html(page) = login(false, "remember-me", None);
        assert!(!page.contains("_csrf"));
        assert!(!page.contains("Invalid username"));
    }

    #[test]
    fn test_welcome_lists_authorities() {
        let user = User::new("admin", String::new(), [Role::user(), Role::admin()]);
        let Html(page) = welcome(&Principal::from_user(&user, AuthMethod::Form));
        assert!(page.contains("Welcome, admin"));
        assert!(page.contains("Roles: ROLE_ADMIN, ROLE_USER"));
    }
}

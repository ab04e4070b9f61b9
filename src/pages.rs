use axum::response::Html;

const TOO_MANY_REQUESTS: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Too many requests</title></head>
<body>
  <h1>Too many requests</h1>
  <p>You have sent too many requests in a short time. Please wait and try again.</p>
</body>
</html>
"#;

const BIO_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>User bio</title></head>
<body>
  <h1>Tell us about yourself</h1>
  <form method="get" action="/req/get">
    <p><label>First name <input type="text" name="a"></label></p>
    <p><label>Last name <input type="text" name="b"></label></p>
    <p><button type="submit">Submit</button></p>
  </form>
</body>
</html>
"#;

const FILE_SIZE_ERROR: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>File too large</title></head>
<body>
  <h1>File too large</h1>
  <p>The uploaded file exceeds the allowed size.</p>
  <p><a href="/req/upload">Try another file</a></p>
</body>
</html>
"#;

// Fixed 429 body
pub fn too_many_requests() -> Html<&'static str> {
    Html(TOO_MANY_REQUESTS)
}

pub fn bio_form() -> Html<&'static str> {
    Html(BIO_FORM)
}

pub fn file_size_error() -> Html<&'static str> {
    Html(FILE_SIZE_ERROR)
}

pub fn query_result(result: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Query params</title></head>
<body>
  <h1>Query params</h1>
  <p>Result: <strong>{}</strong></p>
</body>
</html>
"#,
        escape(result)
    ))
}

// `notice` is shown above the form, e.g. after a successful save
pub fn upload_form(notice: Option<&str>) -> Html<String> {
    let notice = notice
        .map(|n| format!("  <p class=\"notice\">{}</p>\n", escape(n)))
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>File upload</title></head>
<body>
  <h1>Upload a file</h1>
{notice}  <form method="post" enctype="multipart/form-data">
    <p><input type="file" name="file"></p>
    <p><button type="submit">Upload</button></p>
  </form>
</body>
</html>
"#
    ))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/b&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_query_result_is_escaped() {
        let Html(body) = query_result("<script>");
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_upload_form_notice() {
        let Html(plain) = upload_form(None);
        assert!(!plain.contains("notice"));

        let Html(saved) = upload_form(Some("saved as report.txt"));
        assert!(saved.contains("saved as report.txt"));
    }
}

//! HTML for the task form

const EXAMPLES: [&str; 4] = [
    "Go to Gmail and compose a new email",
    "Search for flights from New York to London",
    "Create a new Google Doc",
    "Go to YouTube and play music",
];

/// Render the page with the given form values
pub fn render_page(task: &str, headless: bool, output: &str) -> String {
    let examples: String = EXAMPLES
        .iter()
        .map(|e| format!("        <li>\"{}\"</li>\n", escape_html(e)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Browser Operator</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #1f2933; }}
    .row {{ display: flex; gap: 2rem; flex-wrap: wrap; }}
    .column {{ flex: 1; min-width: 320px; display: flex; flex-direction: column; gap: 0.75rem; }}
    textarea {{ width: 100%; font: inherit; padding: 0.5rem; box-sizing: border-box; }}
    button {{ background: #ea580c; color: white; border: 0; padding: 0.6rem 1rem; font-size: 1rem; cursor: pointer; }}
    label {{ font-weight: 600; }}
  </style>
</head>
<body>
  <h1>Browser Task Automation</h1>
  <p>Examples:</p>
  <ul>
{examples}  </ul>
  <form method="post" action="/run">
    <div class="row">
      <div class="column">
        <label for="task">Task Description</label>
        <textarea id="task" name="task" rows="3" placeholder="E.g., &quot;Go to Gmail and compose a new email&quot;">{task}</textarea>
        <label><input type="checkbox" id="headless" name="headless"{checked}> Run Headless</label>
        <button type="submit">Execute Task</button>
      </div>
      <div class="column">
        <label for="output">Execution Log</label>
        <textarea id="output" rows="15" readonly>{output}</textarea>
      </div>
    </div>
  </form>
</body>
</html>
"#,
        examples = examples,
        task = escape_html(task),
        checked = if headless { " checked" } else { "" },
        output = escape_html(output),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_keeps_values() {
        let page = render_page("Open <news>", true, "Task: Open <news>");
        assert!(page.contains(">Open &lt;news&gt;</textarea>"));
        assert!(page.contains("name=\"headless\" checked"));
        assert!(page.contains("Task: Open &lt;news&gt;</textarea>"));
    }

    #[test]
    fn test_render_unchecked_by_default() {
        let page = render_page("", false, "");
        assert!(!page.contains(" checked"));
        assert!(page.contains("<title>Browser Operator</title>"));
    }
}

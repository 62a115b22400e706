//! The embedded upload page.

use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>serial-stamp</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }
textarea { width: 100%; height: 16rem; font-family: monospace; }
img { max-width: 100%; border: 1px solid #ccc; margin-top: 1rem; }
</style>
</head>
<body>
<h1>serial-stamp</h1>
<form id="stamp">
<p><textarea name="spec">[layout]
grid-size = [2, 4]
gap = 10
margin = 20

[[texts]]
template = "No. $n"
position = [10, 10]
size = 24

[[params]]
name = "n"
type = "int"
min = 1
max = 16
leading-zeros = 3
</textarea></p>
<p>Template image: <input type="file" name="image" accept="image/*"></p>
<p>
<button type="button" data-action="preview">Preview</button>
<button type="button" data-action="generate">Download PDF</button>
<button type="button" data-action="plan">Plan</button>
</p>
</form>
<pre id="message"></pre>
<img id="preview" hidden>
<script>
const form = document.getElementById("stamp");
const message = document.getElementById("message");
const preview = document.getElementById("preview");
for (const button of form.querySelectorAll("button")) {
  button.addEventListener("click", async () => {
    const action = button.dataset.action;
    message.textContent = "";
    const res = await fetch("/api/" + action, { method: "POST", body: new FormData(form) });
    const type = res.headers.get("content-type") || "";
    if (type.startsWith("application/json")) {
      message.textContent = JSON.stringify(await res.json(), null, 2);
    } else if (res.status === 204) {
      message.textContent = "Nothing to render";
    } else if (action === "preview") {
      preview.src = URL.createObjectURL(await res.blob());
      preview.hidden = false;
    } else {
      const link = document.createElement("a");
      link.href = URL.createObjectURL(await res.blob());
      link.download = "tickets.pdf";
      link.click();
    }
  });
}
</script>
</body>
</html>
"#;

/// Serve the upload page.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

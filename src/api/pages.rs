//! Server-rendered HTML pages.

use crate::api::http::escape_html;
use crate::recommend::Recommendation;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Eco Connect</title>
</head>
<body>
<header><nav><a href="/">Eco Connect</a> | <a href="/upload">Scan an item</a> | <a href="/feedback">Feedback</a></nav></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

pub fn home() -> String {
    layout(
        "Home",
        r#"<h1>Eco Connect</h1>
<p>Photograph a waste item and find out how to recycle, sell, donate or compost it.</p>
<p><a href="/upload">Upload an image</a></p>"#,
    )
}

pub fn upload() -> String {
    layout(
        "Upload",
        r#"<h1>Upload an item</h1>
<form action="/upload_action" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept="image/*" required>
<button type="submit">Classify</button>
</form>"#,
    )
}

pub struct ClassifyView<'a> {
    pub image_url: &'a str,
    pub label: &'a str,
    pub confidence: &'a str,
    pub components: &'a [String],
}

pub fn classify(view: &ClassifyView<'_>) -> String {
    let components: String = view
        .components
        .iter()
        .map(|component| format!("<li>{}</li>", escape_html(component)))
        .collect();
    let body = format!(
        r#"<h1>Classification</h1>
<img src="{image_url}" alt="uploaded item" width="320">
<p>Detected: <strong>{label}</strong></p>
<p>Confidence: {confidence}%</p>
<h2>Components</h2>
<ul>{components}</ul>
<p><a href="/questions">Get recommendations</a></p>"#,
        image_url = escape_html(view.image_url),
        label = escape_html(view.label),
        confidence = escape_html(view.confidence),
        components = components
    );
    layout("Classification", &body)
}

pub fn questions() -> String {
    layout(
        "Questions",
        r#"<h1>Tell us about the item</h1>
<form action="/recommendations" method="post">
<label>Condition
<select name="condition">
<option>Good</option><option>Usable</option><option>Damaged</option><option>Broken</option>
</select></label>
<label>What would you like to do?
<select name="intent">
<option>Sell</option><option>Donate</option><option>Dispose</option><option>Recycle</option>
</select></label>
<button type="submit">Show recommendations</button>
</form>"#,
    )
}

pub fn recommendations(rec: &Recommendation) -> String {
    let centers: String = rec
        .centers
        .iter()
        .map(|center| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(center.name),
                center.kind,
                escape_html(center.distance),
                escape_html(center.contact)
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Recommendations</h1>
<section>
<h2>What is best: {best_action}</h2>
<p>{best_description}</p>
</section>
<section>
<h2>Your response: {user_recommendation}</h2>
<p>{summary}</p>
</section>
<h2>Nearby centers</h2>
<table>
<tr><th>Name</th><th>Type</th><th>Distance</th><th>Contact</th></tr>
{centers}
</table>
<p><a href="/feedback">Leave feedback</a></p>"#,
        best_action = escape_html(&rec.best_action),
        best_description = escape_html(&rec.best_description),
        user_recommendation = escape_html(&rec.user_recommendation),
        summary = escape_html(&rec.user_response_summary),
        centers = centers
    );
    layout("Recommendations", &body)
}

pub fn feedback(saved: Option<u8>) -> String {
    let notice = match saved {
        Some(rating) => format!("<p>Thanks! You rated us {rating} of 5.</p>"),
        None => String::new(),
    };
    let body = format!(
        r#"<h1>Feedback</h1>
{notice}
<form action="/feedback" method="post">
<label>Rating
<select name="rating">
<option>5</option><option>4</option><option>3</option><option>2</option><option>1</option>
</select></label>
<label>Comment <textarea name="comment"></textarea></label>
<button type="submit">Send</button>
</form>"#
    );
    layout("Feedback", &body)
}

pub fn error(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            "<h1>{}</h1><p>{}</p>",
            escape_html(title),
            escape_html(message)
        ),
    )
}

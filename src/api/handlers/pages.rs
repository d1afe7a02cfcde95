//! Browser entry points. Markup and assets are served by the front end; these
//! shells only load it.

use axum::response::Html;

fn shell(title: &str, view: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title} | Mottu</title>
<link rel="stylesheet" href="/css/style.css">
</head>
<body data-view="{view}">
<main id="app"></main>
<script src="/js/app.js"></script>
</body>
</html>
"#
    ))
}

pub async fn index() -> Html<String> {
    shell("Início", "index")
}

pub async fn login() -> Html<String> {
    shell("Login", "login")
}

pub async fn register() -> Html<String> {
    shell("Cadastro", "cadastro")
}

pub async fn dashboard() -> Html<String> {
    shell("Dashboard", "dashboard")
}

pub async fn admin() -> Html<String> {
    shell("Administração", "admin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shells_name_their_view() {
        let Html(body) = login().await;
        assert!(body.contains(r#"data-view="login""#));
        assert!(body.contains("<title>Login | Mottu</title>"));
    }
}

use serde::Deserialize;

/// Form body of `POST /create`.
#[derive(Deserialize)]
pub struct CreateUrlForm {
    #[serde(default)]
    pub url: String,
}

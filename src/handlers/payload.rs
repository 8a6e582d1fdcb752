use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::models::user::UserFields;

/// User fields taken from either a JSON or an URL-encoded form body.
///
/// Anything that is not declared as a form is handed to the JSON extractor, which owns the
/// rejection for unsupported content types.
#[derive(Debug)]
pub struct UserPayload(pub UserFields);

impl<S> FromRequest<S> for UserPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(fields) = Form::<UserFields>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(fields))
        } else {
            let Json(fields) = Json::<UserFields>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(fields))
        }
    }
}

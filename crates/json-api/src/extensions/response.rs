//! Response helpers.

use salvo::{
    http::{StatusCode, header::LOCATION},
    prelude::{Response, StatusError},
};
use tracing::error;

pub(crate) trait CreatedExt {
    /// Answers `201 Created` pointing at `location`.
    fn created_at(&mut self, location: &str) -> Result<(), StatusError>;
}

impl CreatedExt for Response {
    fn created_at(&mut self, location: &str) -> Result<(), StatusError> {
        self.add_header(LOCATION, location, true).map_err(|source| {
            error!(location, "failed to set location header: {source}");

            StatusError::internal_server_error()
        })?;

        self.status_code(StatusCode::CREATED);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn created_sets_status_and_location() -> TestResult {
        let mut res = Response::new();

        res.created_at("/orders/42")?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/orders/42")
        );

        Ok(())
    }
}

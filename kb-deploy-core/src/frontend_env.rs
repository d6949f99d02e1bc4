//! Config Exporter: renders the `VITE_*` settings block for the front-end build.

use std::fmt;

use crate::error::Result;
use crate::outputs::OutputSet;

pub const LAMBDA_FUNCTION_ARN: &str = "lambda_function_arn";
pub const COGNITO_USER_POOL_ID: &str = "cognito_user_pool_id";
pub const COGNITO_USER_POOL_CLIENT_ID: &str = "cognito_user_pool_client_id";
pub const COGNITO_IDENTITY_POOL_ID: &str = "cognito_identity_pool_id";

/// Output keys the exporter dereferences.
pub const REQUIRED_OUTPUTS: [&str; 4] = [
    LAMBDA_FUNCTION_ARN,
    COGNITO_USER_POOL_ID,
    COGNITO_USER_POOL_CLIENT_ID,
    COGNITO_IDENTITY_POOL_ID,
];

pub const API_NAME: &str = "RestAPI";
pub const APP_NAME: &str = "Financial Assistant powered by GenAI";

/// Front-end settings resolved from infrastructure outputs.
///
/// Construction looks up every required key, so a value of this type can always be
/// rendered in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendEnv {
    pub api_function_arn: String,
    pub region: String,
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub identity_pool_id: String,
}

impl FrontendEnv {
    pub fn from_outputs(outputs: &OutputSet, region: &str) -> Result<Self> {
        Ok(Self {
            api_function_arn: outputs.require_text(LAMBDA_FUNCTION_ARN)?,
            region: region.to_string(),
            user_pool_id: outputs.require_text(COGNITO_USER_POOL_ID)?,
            user_pool_client_id: outputs.require_text(COGNITO_USER_POOL_CLIENT_ID)?,
            identity_pool_id: outputs.require_text(COGNITO_IDENTITY_POOL_ID)?,
        })
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FrontendEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "VITE_API_GATEWAY_REST_API_ENDPOINT=\"\"")?;
        writeln!(f, "VITE_API_FUNCTION_ARN=\"{}\"", self.api_function_arn)?;
        writeln!(f, "VITE_AWS_REGION=\"{}\"", self.region)?;
        writeln!(f, "VITE_COGNITO_USER_POOL_ID=\"{}\"", self.user_pool_id)?;
        writeln!(f, "VITE_COGNITO_USER_POOL_CLIENT_ID=\"{}\"", self.user_pool_client_id)?;
        writeln!(f, "VITE_COGNITO_IDENTITY_POOL_ID=\"{}\"", self.identity_pool_id)?;
        writeln!(f, "VITE_API_NAME=\"{API_NAME}\"")?;
        writeln!(f, "VITE_APP_LOGO_URL=\"\"")?;
        writeln!(f, "VITE_APP_NAME=\"{APP_NAME}\"")
    }
}

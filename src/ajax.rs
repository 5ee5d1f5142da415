//! Authorization request construction for `ajaxm.php`.

use crate::deobfuscate::{patterns, ScriptPayload};
use crate::error::Result;
use url::form_urlencoded;
use url::Url;

/// Ordered form fields for one authorization POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxForm {
    fields: Vec<(String, String)>,
}

impl Default for AjaxForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AjaxForm {
    /// Create a form carrying `action=downprocess`.
    pub fn new() -> Self {
        Self {
            fields: vec![("action".to_string(), "downprocess".to_string())],
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

/// A ready-to-send authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxRequest {
    /// Query suffix captured after `ajaxm.php`.
    pub suffix: String,
    pub form: AjaxForm,
}

impl AjaxRequest {
    /// `<origin>/ajaxm.php<suffix>`.
    pub fn endpoint(&self, origin: &Url) -> Result<Url> {
        Ok(origin.join(&format!("/ajaxm.php{}", self.suffix))?)
    }

    /// Request for a password-gated page.
    pub fn for_password(script: &ScriptPayload, password: &str) -> Result<Self> {
        let suffix = script.field(patterns::AJAX_SUFFIX)?;
        let form = AjaxForm::new()
            .field("sign", script.field(patterns::PASSWORD_SIGN)?)
            .field("p", password)
            .field("kd", script.field_or(patterns::KD, patterns::KD_DEFAULT)?);
        Ok(Self { suffix, form })
    }

    /// Request for the iframe document of an open page.
    pub fn for_iframe(script: &ScriptPayload) -> Result<Self> {
        let suffix = script.field(patterns::AJAX_SUFFIX)?;
        let form = AjaxForm::new()
            .field("signs", script.field(patterns::SIGNS)?)
            .field("sign", script.field(patterns::SIGN)?)
            .field("websign", script.field(patterns::WEBSIGN)?)
            .field("websignkey", script.field(patterns::WEBSIGNKEY)?)
            .field("ves", script.field(patterns::VES)?)
            .field("kd", script.field_or(patterns::KD, patterns::KD_DEFAULT)?);
        Ok(Self { suffix, form })
    }
}

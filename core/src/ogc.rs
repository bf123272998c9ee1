//! OGC web service settings stored in web metadata.
//!
//! Service settings are looked up under the service's own prefix first
//! (`wms_title`) and then under the shared `ows_` prefix (`ows_title`).

use crate::document::Document;
use crate::keyvalue::KeyValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OgcService {
    Wms,
    Wfs,
}

impl OgcService {
    pub fn prefix(self) -> &'static str {
        match self {
            OgcService::Wms => "wms",
            OgcService::Wfs => "wfs",
        }
    }
}

/// Value of `{service}_{key}`, or of `ows_{key}` when the former is absent.
///
/// `metadata` keys are expected in lower case.
pub fn lookup<'a>(metadata: &'a KeyValues, service: OgcService, key: &str) -> Option<&'a str> {
    let key = key.to_ascii_lowercase();
    metadata
        .get(&format!("{}_{key}", service.prefix()))
        .or_else(|| metadata.get(&format!("ows_{key}")))
        .map(String::as_str)
}

/// Whether `request` is enabled by the `enable_request` settings.
///
/// `{service}_enable_request` and `ows_enable_request` are evaluated on
/// their own and the request is enabled if either one enables it.
/// Each setting is a whitespace-separated list. `*` enables every request,
/// `!*` disables every request, `Name` and `!Name` enable and disable one.
/// Tokens apply left to right, except that `!Name` always wins for `Name`
/// within the same setting. Matching ignores case. No setting means
/// nothing is enabled.
pub fn request_enabled(metadata: &KeyValues, service: OgcService, request: &str) -> bool {
    let setting = |key: String| metadata.get(&key).map(String::as_str);
    setting_enables(setting(format!("{}_enable_request", service.prefix())), request)
        || setting_enables(setting("ows_enable_request".to_owned()), request)
}

fn setting_enables(setting: Option<&str>, request: &str) -> bool {
    let Some(setting) = setting else {
        return false;
    };
    let mut enabled = false;
    for token in setting.split_whitespace() {
        match token.strip_prefix('!') {
            Some(name) if name.eq_ignore_ascii_case(request) => return false,
            Some("*") => enabled = false,
            Some(_) => {}
            None if token == "*" || token.eq_ignore_ascii_case(request) => enabled = true,
            None => {}
        }
    }
    enabled
}

impl Document {
    pub fn ogc_title(&self, service: OgcService) -> Option<&str> {
        lookup(self.metadata(), service, "title")
    }

    pub fn ogc_online_resource(&self, service: OgcService) -> Option<&str> {
        lookup(self.metadata(), service, "onlineresource")
    }

    pub fn ogc_srs(&self, service: OgcService) -> Option<&str> {
        lookup(self.metadata(), service, "srs")
    }

    pub fn ogc_request_enabled(&self, service: OgcService, request: &str) -> bool {
        request_enabled(self.metadata(), service, request)
    }
}

//! Embedded templates and version tags
//!
//! Everything here is compiled into the binary, so generation never depends
//! on files outside the job definitions.

use prowgen_core::JobKind;

const PRESUBMIT_TEMPLATE: &str = include_str!("../templates/presubmits.yaml");
const POSTSUBMIT_TEMPLATE: &str = include_str!("../templates/postsubmits.yaml");
const PERIODIC_TEMPLATE: &str = include_str!("../templates/periodics.yaml");
const EDIT_WARNING: &str = include_str!("../templates/warning.txt");
const BUILDER_BASE_TAG: &str = include_str!("../templates/BUILDER_BASE_TAG_FILE");

/// Default buildkit image tag used by buildx jobs
pub const BUILDKIT_IMAGE_TAG: &str = "v0.12.3-rootless";

/// Template text for a job kind
pub fn template_for(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Periodic => PERIODIC_TEMPLATE,
        JobKind::Postsubmit => POSTSUBMIT_TEMPLATE,
        JobKind::Presubmit => PRESUBMIT_TEMPLATE,
    }
}

/// Banner placed at the top of every generated file
pub fn edit_warning() -> &'static str {
    EDIT_WARNING.trim_end()
}

/// Builder base tag shipped with this build
pub fn builder_base_tag() -> &'static str {
    BUILDER_BASE_TAG.trim()
}

//! Task-group identifiers in the taskcluster "nice" slug format: a v4 UUID
//! encoded as 22 characters of URL-safe base64 with the top bit cleared, so a
//! slug never starts with `-` and can be passed on a command line.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use uuid::Uuid;

pub fn nice() -> String {
    let mut bytes = *Uuid::new_v4().as_bytes();
    bytes[0] &= 0x7f;
    URL_SAFE_NO_PAD.encode(bytes)
}

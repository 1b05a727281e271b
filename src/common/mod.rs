
pub mod certificate;
pub mod codec;

pub const HEADER_IC_CERTIFICATE: &str = "ic-certificate";

pub const HEADER_CONTENT_ENCODING: &str = "content-encoding";

pub const HEADER_ACCEPT_ENCODING: &str = "Accept-Encoding";

/// Sent on the caller's behalf when the browser did not ask for an encoding.
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, identity";

pub const MSG_BODY_NOT_VERIFIED: &str = "Body does not pass verification";

pub fn print_banner(mode: &str) {
    // We don't need this as a constant because it will be shown only once.
    let banner: &str = "\n\n\
\x20        ___________________________\n\
\x20       |  _______________________  |\n\
\x20       | |    CERTIFIED  ONLY    | |\n\
\x20       | |_______________________| |\n\
\x20       |___________________________|\n\
\x20  ==================================\n";
    println!("{}\x20  Mode: {}\n\n", banner, mode);
}

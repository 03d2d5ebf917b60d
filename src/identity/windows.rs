//! Windows account lookup
//!
//! Resolves SIDs through `LookupAccountSidW`, against the local machine or a
//! named server (usually a domain controller). The server name is the only
//! session state; the OS keeps the connection to the domain.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use windows_sys::Win32::Foundation::{
    GetLastError, LocalFree, ERROR_INSUFFICIENT_BUFFER, ERROR_NONE_MAPPED, PSID,
};
use windows_sys::Win32::Security::Authorization::ConvertStringSidToSidW;
use windows_sys::Win32::Security::{LookupAccountSidW, SID_NAME_USE};

use super::sid::is_valid_sid;
use super::{DirectoryError, DirectoryService, Identity};

/// Initial name buffer size in UTF-16 units
const NAME_BUFFER_LEN: u32 = 256;

fn to_wide(value: &str) -> Vec<u16> {
    OsStr::new(value)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// SID allocated by `ConvertStringSidToSidW`, freed on drop
struct OwnedSid(PSID);

impl Drop for OwnedSid {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                LocalFree(self.0);
            }
        }
    }
}

/// Account lookup context for one scan session
pub struct AccountLookup {
    server: Option<Vec<u16>>,
}

impl AccountLookup {
    /// Look accounts up on `server`, or on the local machine's domain when `None`
    pub fn new(server: Option<&str>) -> Self {
        Self {
            server: server.filter(|s| !s.trim().is_empty()).map(to_wide),
        }
    }

    fn lookup_error(sid: &str, code: u32) -> DirectoryError {
        DirectoryError::Lookup {
            sid: sid.to_string(),
            message: std::io::Error::from_raw_os_error(code as i32).to_string(),
        }
    }
}

impl DirectoryService for AccountLookup {
    fn find_by_identity(&self, sid: &str) -> Result<Option<Identity>, DirectoryError> {
        if !is_valid_sid(sid) {
            return Err(DirectoryError::MalformedSid(sid.to_string()));
        }

        let wide_sid = to_wide(sid);
        let mut raw_sid: PSID = ptr::null_mut();
        let converted = unsafe { ConvertStringSidToSidW(wide_sid.as_ptr(), &mut raw_sid) };
        if converted == 0 {
            return Err(DirectoryError::MalformedSid(sid.to_string()));
        }
        let owned = OwnedSid(raw_sid);

        let server = self
            .server
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null());

        let mut name_len = NAME_BUFFER_LEN;
        let mut domain_len = NAME_BUFFER_LEN;

        // At most one resize when the first buffers are too small
        for _ in 0..2 {
            let mut name = vec![0u16; name_len as usize];
            let mut domain = vec![0u16; domain_len as usize];
            let mut sid_use: SID_NAME_USE = 0;

            let ok = unsafe {
                LookupAccountSidW(
                    server,
                    owned.0,
                    name.as_mut_ptr(),
                    &mut name_len,
                    domain.as_mut_ptr(),
                    &mut domain_len,
                    &mut sid_use,
                )
            };

            if ok != 0 {
                let account = String::from_utf16_lossy(&name[..name_len as usize]);
                let domain = String::from_utf16_lossy(&domain[..domain_len as usize]);
                let mut identity = Identity::new(sid, account);
                if !domain.is_empty() {
                    identity = identity.with_domain(domain);
                }
                return Ok(Some(identity));
            }

            match unsafe { GetLastError() } {
                ERROR_NONE_MAPPED => return Ok(None),
                ERROR_INSUFFICIENT_BUFFER => continue,
                code => return Err(Self::lookup_error(sid, code)),
            }
        }

        Err(Self::lookup_error(sid, ERROR_INSUFFICIENT_BUFFER))
    }
}

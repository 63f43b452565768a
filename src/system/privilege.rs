//! Lock-pages-in-memory privilege probe
//!
//! Answers whether a process's primary token currently grants the
//! SeLockMemoryPrivilege. Any failure along the way (process gone, token
//! inaccessible, privilege list unreadable) reads as "no privilege" rather
//! than an error; a single unreadable process must not fail a snapshot.

use std::ptr;

use windows::core::PCWSTR;
use windows::Win32::Foundation::LUID;
use windows::Win32::Security::{
    GetTokenInformation, LookupPrivilegeValueW, TokenPrivileges, SE_LOCK_MEMORY_NAME,
    SE_PRIVILEGE_ENABLED, SE_PRIVILEGE_ENABLED_BY_DEFAULT, TOKEN_QUERY,
};
use windows::Win32::System::Threading::PROCESS_QUERY_LIMITED_INFORMATION;

use crate::ffi::{ProcessHandle, TokenHandle};

// TOKEN_PRIVILEGES is a count followed by packed 12-byte
// LUID_AND_ATTRIBUTES elements (u32 low part, i32 high part, u32 attributes).
const PRIVILEGE_ARRAY_OFFSET: usize = 4;
const PRIVILEGE_ELEMENT_SIZE: usize = 12;

/// Checks whether the process holds the lock-pages privilege with the
/// enabled or enabled-by-default attribute set.
pub fn has_lock_pages_privilege(pid: u32) -> bool {
    let process = match ProcessHandle::open(pid, PROCESS_QUERY_LIMITED_INFORMATION) {
        Ok(process) => process,
        Err(_) => return false, // Access denied or process gone
    };
    let token = match TokenHandle::open(&process, TOKEN_QUERY) {
        Ok(token) => token,
        Err(_) => return false,
    };

    let mut lock_memory = LUID::default();
    // SAFETY: LookupPrivilegeValueW only writes the output LUID.
    let looked_up = unsafe {
        LookupPrivilegeValueW(PCWSTR::null(), SE_LOCK_MEMORY_NAME, &mut lock_memory)
    };
    if looked_up.is_err() {
        return false;
    }

    let privileges = match read_token_privileges(&token) {
        Some(privileges) => privileges,
        None => return false,
    };

    scan_for_privilege(&privileges, lock_memory)
}

/// Reads the token's raw TOKEN_PRIVILEGES blob, sizing it with a probe call.
fn read_token_privileges(token: &TokenHandle) -> Option<Vec<u8>> {
    let mut needed: u32 = 0;
    // SAFETY: With no output buffer the call only reports the needed size.
    let _ = unsafe {
        GetTokenInformation(token.as_raw(), TokenPrivileges, None, 0, &mut needed)
    };
    if (needed as usize) < PRIVILEGE_ARRAY_OFFSET {
        return None;
    }

    let mut buffer = vec![0u8; needed as usize];
    // SAFETY: The buffer matches the length we pass.
    let queried = unsafe {
        GetTokenInformation(
            token.as_raw(),
            TokenPrivileges,
            Some(buffer.as_mut_ptr().cast()),
            needed,
            &mut needed,
        )
    };
    if queried.is_err() {
        return None;
    }
    Some(buffer)
}

fn scan_for_privilege(blob: &[u8], target: LUID) -> bool {
    let enabled_mask = SE_PRIVILEGE_ENABLED.0 | SE_PRIVILEGE_ENABLED_BY_DEFAULT.0;
    let count = read_u32(blob, 0) as usize;

    for index in 0..count {
        let offset = PRIVILEGE_ARRAY_OFFSET + index * PRIVILEGE_ELEMENT_SIZE;
        if offset + PRIVILEGE_ELEMENT_SIZE > blob.len() {
            break;
        }
        let low_part = read_u32(blob, offset);
        let high_part = read_u32(blob, offset + 4) as i32;
        let attributes = read_u32(blob, offset + 8);

        if low_part == target.LowPart
            && high_part == target.HighPart
            && attributes & enabled_mask != 0
        {
            return true;
        }
    }

    false
}

fn read_u32(blob: &[u8], offset: usize) -> u32 {
    // SAFETY: Callers bound-check `offset + 4` against the blob length.
    unsafe { ptr::read_unaligned(blob.as_ptr().add(offset) as *const u32) }
}

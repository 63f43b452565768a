//! Safe RAII wrappers for Windows HANDLEs and registry keys
//!
//! These wrappers ensure that handles are properly closed when they
//! go out of scope, preventing resource leaks. Process and token handles
//! are acquired in nested order per process and must be released on every
//! path, including early returns; the `Drop` impls make that automatic.

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, KEY_READ,
};
use windows::Win32::System::Threading::{OpenProcess, OpenProcessToken, PROCESS_ACCESS_RIGHTS};
use windows::Win32::Security::TOKEN_ACCESS_MASK;

/// A safe wrapper around a Windows process HANDLE.
/// Automatically closes the handle when dropped.
pub struct ProcessHandle(HANDLE);

impl ProcessHandle {
    /// Opens a process by PID with the specified access rights.
    ///
    /// # Returns
    /// * `Ok(ProcessHandle)` - A wrapped handle to the process
    /// * `Err` - If the process cannot be opened (access denied, process exited, etc.)
    pub fn open(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> windows::core::Result<Self> {
        // SAFETY: OpenProcess is safe to call with valid parameters.
        // We handle the error case where the handle is invalid.
        let handle = unsafe { OpenProcess(access, false, pid)? };
        Ok(Self(handle))
    }

    /// Returns the raw HANDLE for use with Win32 APIs.
    ///
    /// # Safety
    /// The caller must ensure the handle is not used after the ProcessHandle is dropped.
    pub fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: We own this handle and it's valid (we got it from OpenProcess).
        // CloseHandle is safe to call on a valid handle exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// A safe wrapper around a process's primary access token HANDLE.
/// Automatically closes the handle when dropped.
pub struct TokenHandle(HANDLE);

impl TokenHandle {
    /// Opens the access token of the given process.
    ///
    /// # Returns
    /// * `Ok(TokenHandle)` - A wrapped handle to the token
    /// * `Err` - If the token cannot be opened (access denied, protected process)
    pub fn open(process: &ProcessHandle, access: TOKEN_ACCESS_MASK) -> windows::core::Result<Self> {
        let mut handle = HANDLE::default();
        // SAFETY: OpenProcessToken is safe with a valid process handle; on
        // failure the output handle is left untouched and we return early.
        unsafe { OpenProcessToken(process.as_raw(), access, &mut handle)? };
        Ok(Self(handle))
    }

    /// Returns the raw HANDLE for use with Win32 APIs.
    pub fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for TokenHandle {
    fn drop(&mut self) {
        // SAFETY: We own this handle and it's valid.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// A safe wrapper around an open registry key.
/// Automatically closes the key when dropped.
pub struct RegistryKey(HKEY);

impl RegistryKey {
    /// Opens a subkey of `root` read-only.
    pub fn open(root: HKEY, subkey: PCWSTR) -> windows::core::Result<Self> {
        let mut key = HKEY::default();
        // SAFETY: RegOpenKeyExW is safe with a valid root key and a
        // NUL-terminated subkey path.
        unsafe { RegOpenKeyExW(root, subkey, 0, KEY_READ, &mut key) }.ok()?;
        Ok(Self(key))
    }

    /// Reads a value's raw bytes, sizing the buffer with a first probe call.
    pub fn read_raw_value(&self, name: PCWSTR) -> windows::core::Result<Vec<u8>> {
        let mut len: u32 = 0;
        // SAFETY: With no data pointer the call only reports the value size.
        unsafe { RegQueryValueExW(self.0, name, None, None, None, Some(&mut len)) }.ok()?;

        let mut data = vec![0u8; len as usize];
        // SAFETY: The buffer matches the length we pass; the registry may
        // shrink `len` if the value changed between the two calls.
        unsafe {
            RegQueryValueExW(
                self.0,
                name,
                None,
                None,
                Some(data.as_mut_ptr()),
                Some(&mut len),
            )
        }
        .ok()?;
        data.truncate(len as usize);
        Ok(data)
    }
}

impl Drop for RegistryKey {
    fn drop(&mut self) {
        // SAFETY: We own this key and it's valid.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

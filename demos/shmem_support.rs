//! Minimal named POSIX shared-memory region for the two demo binaries.
//!
//! Backed by a named path under `/dev/shm` rather than an anonymous
//! `memfd_create` region: memfd regions can only be shared across processes
//! by passing the file descriptor itself (over a Unix socket or
//! `/proc/self/fd`), which is more machinery than a demo needs. A named path
//! lets a second, unrelated process open the same region by name instead.
//!
//! This is demonstration plumbing only — not part of the queue's public
//! contract (spec.md §6: "no wire protocol, no file format, no CLI").

use std::ffi::CString;
use std::io;
use std::ptr::{self, NonNull};

pub struct ShmRegion {
    ptr: NonNull<u8>,
    len: usize,
    owner: bool,
    path: CString,
}

unsafe impl Send for ShmRegion {}

impl ShmRegion {
    /// Create (or truncate-and-reuse) the named region, sized `len` bytes.
    pub fn create(name: &str, len: usize) -> io::Result<Self> {
        let path = shm_path(name);
        let fd = unsafe {
            libc::open(
                path.as_ptr(),
                libc::O_CREAT | libc::O_RDWR,
                0o600,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::ftruncate(fd, len as i64) } != 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }
        let region = map(fd, len)?;
        unsafe { libc::close(fd) };
        Ok(Self {
            ptr: region,
            len,
            owner: true,
            path,
        })
    }

    /// Attach to an already-created region of the given size.
    pub fn attach(name: &str, len: usize) -> io::Result<Self> {
        let path = shm_path(name);
        let fd = unsafe { libc::open(path.as_ptr(), libc::O_RDWR, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let region = map(fd, len)?;
        unsafe { libc::close(fd) };
        Ok(Self {
            ptr: region,
            len,
            owner: false,
            path,
        })
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Remove the backing file. Call this from whichever side created it,
    /// after the other side is known to have attached.
    pub fn unlink(&self) {
        unsafe {
            libc::unlink(self.path.as_ptr());
        }
    }
}

impl Drop for ShmRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.len);
        }
        let _ = self.owner; // creator vs. attacher currently treated alike on drop
    }
}

fn map(fd: i32, len: usize) -> io::Result<NonNull<u8>> {
    let ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    Ok(NonNull::new(ptr as *mut u8).expect("mmap returned a non-null success pointer"))
}

fn shm_path(name: &str) -> CString {
    CString::new(format!("/dev/shm/{name}")).expect("region name must not contain NUL bytes")
}

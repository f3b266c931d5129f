// Platform log backend for Android builds.

use std::ffi::CString;

use libc::{c_char, c_int};
use log::{Level, LevelFilter, Log, Metadata, Record};

#[link(name = "log")]
extern "C" {
    fn __android_log_write(prio: c_int, tag: *const c_char, msg: *const c_char) -> c_int;
}

const ANDROID_LOG_VERBOSE: c_int = 2;
const ANDROID_LOG_DEBUG: c_int = 3;
const ANDROID_LOG_INFO: c_int = 4;
const ANDROID_LOG_WARN: c_int = 5;
const ANDROID_LOG_ERROR: c_int = 6;

struct AndroidLogger {
    tag: CString,
    level: LevelFilter,
}

fn priority(level: Level) -> c_int {
    match level {
        Level::Error => ANDROID_LOG_ERROR,
        Level::Warn => ANDROID_LOG_WARN,
        Level::Info => ANDROID_LOG_INFO,
        Level::Debug => ANDROID_LOG_DEBUG,
        Level::Trace => ANDROID_LOG_VERBOSE,
    }
}

impl Log for AndroidLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Interior NULs would truncate the message; strip them instead.
        let text = format!("{}", record.args()).replace('\0', "");
        let Ok(msg) = CString::new(text) else {
            return;
        };
        unsafe {
            __android_log_write(priority(record.level()), self.tag.as_ptr(), msg.as_ptr());
        }
    }

    fn flush(&self) {}
}

pub(super) fn install(tag: &str, level: LevelFilter) {
    let tag = CString::new(tag.replace('\0', ""))
        .unwrap_or_else(|_| CString::from(c"vkpbr-bridge"));
    let logger = AndroidLogger { tag, level };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

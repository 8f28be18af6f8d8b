//! Third-party library usage derived from absolute imports.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::model::FileEntity;
use super::module_map::ModuleMap;

/// Top-level standard library modules (CPython 3.12 `sys.stdlib_module_names`,
/// trimmed of private and platform-only entries).
pub const STANDARD_LIBRARY: &[&str] = &[
    "__future__", "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio", "asyncore",
    "atexit", "audioop", "base64", "bdb", "binascii", "bisect", "builtins", "bz2", "calendar",
    "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs", "codeop", "collections",
    "colorsys", "compileall", "concurrent", "configparser", "contextlib", "contextvars", "copy",
    "copyreg", "cProfile", "crypt", "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm",
    "decimal", "difflib", "dis", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "imaplib", "imghdr", "imp", "importlib",
    "inspect", "io", "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache",
    "locale", "logging", "lzma", "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap",
    "modulefinder", "msvcrt", "multiprocessing", "netrc", "nntplib", "numbers", "operator",
    "optparse", "os", "pathlib", "pdb", "pickle", "pickletools", "pipes", "pkgutil", "platform",
    "plistlib", "poplib", "posix", "pprint", "profile", "pstats", "pty", "pwd", "py_compile",
    "pyclbr", "pydoc", "queue", "quopri", "random", "re", "readline", "reprlib", "resource",
    "rlcompleter", "runpy", "sched", "secrets", "select", "selectors", "shelve", "shlex",
    "shutil", "signal", "site", "smtplib", "sndhdr", "socket", "socketserver", "sqlite3",
    "ssl", "stat", "statistics", "string", "stringprep", "struct", "subprocess", "sunau",
    "symtable", "sys", "sysconfig", "syslog", "tabnanny", "tarfile", "telnetlib", "tempfile",
    "termios", "textwrap", "threading", "time", "timeit", "tkinter", "token", "tokenize",
    "tomllib", "trace", "traceback", "tracemalloc", "tty", "turtle", "types", "typing",
    "unicodedata", "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref",
    "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp",
    "zipfile", "zipimport", "zlib", "zoneinfo",
];

pub fn is_standard_library(root: &str) -> bool {
    STANDARD_LIBRARY.contains(&root)
}

/// Counts absolute imports whose root is neither standard library, an
/// internal namespace, nor a top-level module of the project itself.
pub struct ExternalLibraryCollector<'a> {
    internal_prefixes: &'a [String],
    project_roots: HashSet<String>,
}

impl<'a> ExternalLibraryCollector<'a> {
    pub fn new(internal_prefixes: &'a [String]) -> Self {
        Self {
            internal_prefixes,
            project_roots: HashSet::new(),
        }
    }

    /// Also treat the first segment of every project module as internal,
    /// which covers namespace packages without an `__init__.py`.
    pub fn with_modules(mut self, modules: &ModuleMap) -> Self {
        self.project_roots = modules
            .iter()
            .filter_map(|(module, _)| module.split('.').next())
            .map(str::to_string)
            .collect();
        self
    }

    /// Library root -> usage count, most used first; ties keep first-seen order.
    pub fn collect<'f, I>(&self, files: I) -> IndexMap<String, usize>
    where
        I: IntoIterator<Item = &'f FileEntity>,
    {
        let mut counts: IndexMap<String, usize> = IndexMap::new();

        for file in files {
            for import in &file.imports {
                if import.is_relative {
                    continue;
                }
                let Some(root) = import.root_name() else {
                    continue;
                };
                if self.is_external(root) {
                    *counts.entry(root.to_string()).or_insert(0) += 1;
                }
            }
        }

        // IndexMap::sort_by is stable.
        counts.sort_by(|_, left, _, right| right.cmp(left));
        counts
    }

    pub fn is_external(&self, root: &str) -> bool {
        if is_standard_library(root) {
            return false;
        }
        if self.internal_prefixes.iter().any(|prefix| prefix == root) {
            return false;
        }
        !self.project_roots.contains(root)
    }
}

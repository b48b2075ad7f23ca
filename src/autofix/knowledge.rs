//! Built-in table of known failure signatures.
//!
//! The table is an ordered `Vec`, not a map: when more than one signature
//! occurs in an error type, the entry listed first wins.

/// One known failure signature and the templates reported when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub signature: &'static str,
    pub analysis: &'static str,
    pub fix: &'static str,
    pub patch: &'static str,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    /// Lowercased signatures, parallel to `entries`.
    folded: Vec<String>,
}

impl KnowledgeBase {
    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        let folded = entries.iter().map(|e| e.signature.to_lowercase()).collect();
        Self { entries, folded }
    }

    /// The canonical table, in first-match-wins order.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_ENTRIES.to_vec())
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// First entry whose signature is a case-insensitive substring of `error_type`.
    pub fn lookup(&self, error_type: &str) -> Option<&KnowledgeEntry> {
        let haystack = error_type.to_lowercase();
        self.folded
            .iter()
            .position(|sig| haystack.contains(sig.as_str()))
            .map(|idx| &self.entries[idx])
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_ENTRIES: [KnowledgeEntry; 8] = [
    KnowledgeEntry {
        signature: "ZeroDivisionError",
        analysis: "Division by zero detected. The code attempts to divide a number by zero.",
        fix: "Add a check before division: `if divisor != 0:` or use try-except block.",
        patch: r#"-    result = numerator / divisor
+    if divisor != 0:
+        result = numerator / divisor
+    else:
+        result = 0  # or raise custom exception
"#,
    },
    KnowledgeEntry {
        signature: "AttributeError",
        analysis: "Attempting to access an attribute on a None object (NullPointerException equivalent).",
        fix: "Add null check before accessing the attribute: `if obj is not None:`",
        patch: r#"-    return {"username": user.name}
+    if user is not None:
+        return {"username": user.name}
+    else:
+        return {"username": "Unknown"}
"#,
    },
    KnowledgeEntry {
        signature: "KeyError",
        analysis: "Attempting to access a dictionary key that doesn't exist.",
        fix: "Use .get() method with default value: `dict.get('key', default_value)`",
        patch: r#"-    return {"email": api_response["email"]}
+    return {"email": api_response.get("email", "not_provided@example.com")}
"#,
    },
    KnowledgeEntry {
        signature: "ConnectionError",
        analysis: "Database or external service connection failed.",
        fix: "Add retry logic with exponential backoff and connection pooling.",
        patch: r#"+import time
+from functools import wraps
+
+def retry_connection(max_retries=3, delay=1):
+    def decorator(func):
+        @wraps(func)
+        def wrapper(*args, **kwargs):
+            for attempt in range(max_retries):
+                try:
+                    return func(*args, **kwargs)
+                except ConnectionError:
+                    if attempt < max_retries - 1:
+                        time.sleep(delay * (2 ** attempt))
+            raise ConnectionError("Max retries exceeded")
+        return wrapper
+    return decorator
"#,
    },
    KnowledgeEntry {
        signature: "TimeoutError",
        analysis: "External service request timed out.",
        fix: "Implement circuit breaker pattern and async requests with timeout handling.",
        patch: r#"+import asyncio
+
+async def call_with_timeout(func, timeout=10):
+    try:
+        return await asyncio.wait_for(func(), timeout=timeout)
+    except asyncio.TimeoutError:
+        return {"error": "Service temporarily unavailable"}
"#,
    },
    KnowledgeEntry {
        signature: "ValueError",
        analysis: "Invalid value passed to function (e.g., converting non-numeric string to number).",
        fix: "Add input validation before processing.",
        patch: r#"-    total = float(price) * 1.18
+    try:
+        total = float(price) * 1.18
+    except ValueError:
+        total = 0.0
+        # Log the error for debugging
"#,
    },
    KnowledgeEntry {
        signature: "PermissionError",
        analysis: "Unauthorized access attempt detected.",
        fix: "Implement proper authentication middleware and role-based access control.",
        patch: r#"+from functools import wraps
+
+def require_permission(permission):
+    def decorator(func):
+        @wraps(func)
+        def wrapper(user, *args, **kwargs):
+            if permission in user.permissions:
+                return func(user, *args, **kwargs)
+            raise HTTPException(403, "Access denied")
+        return wrapper
+    return decorator
"#,
    },
    KnowledgeEntry {
        signature: "FileNotFoundError",
        analysis: "Attempting to read a file that doesn't exist.",
        fix: "Add file existence check and provide fallback configuration.",
        patch: r#"+import os
+
-    with open("/etc/app/missing-config.yaml", "r") as f:
-        return {"config": f.read()}
+    config_path = "/etc/app/missing-config.yaml"
+    if os.path.exists(config_path):
+        with open(config_path, "r") as f:
+            return {"config": f.read()}
+    else:
+        return {"config": "default_configuration"}
"#,
    },
];

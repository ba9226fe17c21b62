//! Decoy code for guarded scripts.
//!
//! Identifiers and filler are drawn from the guard's seeded stream, so the
//! same script and spec always produce the same text.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rustc_hash::FxHashSet;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random part of an identifier.
pub const IDENTIFIER_LEN: usize = 8;

/// Hands out unique decoy identifiers and filler snippets.
#[derive(Debug, Clone)]
pub struct DecoyGenerator {
    rng: ChaCha20Rng,
    issued: FxHashSet<String>,
}

impl DecoyGenerator {
    /// Create a generator drawing from `rng`.
    pub fn new(rng: ChaCha20Rng) -> Self {
        Self {
            rng,
            issued: FxHashSet::default(),
        }
    }

    /// A fresh `prefix_XXXXXXXX` identifier, never repeated by this
    /// generator.
    pub fn identifier(&mut self, prefix: &str) -> String {
        self.identifier_with_len(prefix, IDENTIFIER_LEN)
    }

    fn identifier_with_len(&mut self, prefix: &str, len: usize) -> String {
        loop {
            let suffix: String = (0..len)
                .map(|_| char::from(ALPHABET[self.rng.gen_range(0..ALPHABET.len())]))
                .collect();
            let name = format!("{prefix}_{suffix}");
            if self.issued.insert(name.clone()) {
                return name;
            }
        }
    }

    /// A dead helper function. It is defined but never called.
    pub fn helper_function(&mut self) -> String {
        let name = self.identifier_with_len("func", 6);
        let seed = self.identifier_with_len("tmp", 4);
        let digest = self.identifier_with_len("tmp", 4);
        format!(
            "def {name}():\n\
             \x20   {seed} = random.randint(1, 999)\n\
             \x20   {digest} = hashlib.sha256(str({seed}).encode()).hexdigest()\n\
             \x20   return {digest}[:8]\n"
        )
    }

    /// An assignment of a plausible but unused value, at `indent`.
    pub fn assignment(&mut self, indent: &str) -> String {
        const EXPRESSIONS: [&str; 4] = [
            "random.randint(1, 1000)",
            "time.time()",
            "hashlib.md5(str(random.random()).encode()).hexdigest()",
            "datetime.datetime.now().isoformat()",
        ];
        let name = self.identifier_with_len("data", 5);
        let expr = EXPRESSIONS[self.rng.gen_range(0..EXPRESSIONS.len())];
        format!("{indent}{name} = {expr}\n")
    }
}

// ============================================================================
// Decoy branch bodies
// ============================================================================

/// A fake fatal log line followed by a pause.
pub fn error_log(indent: &str) -> String {
    format!(
        "{indent}print(\"!!! CRITICAL_ERROR_LOG detected.\")\n\
         {indent}time.sleep(random.uniform(1, 2.5))\n"
    )
}

/// A fake progress scan that ends in a halt message.
pub fn fake_scan(indent: &str) -> String {
    format!(
        "{indent}for i in range(101):\n\
         {indent}    time.sleep(0.01)\n\
         {indent}    print(f\"\\r[SCAN] {{i}}%\", end=\"\")\n\
         {indent}print(\"\\n!!! Process halted !!!\")\n"
    )
}

/// Pointless arithmetic.
pub fn busy_work(indent: &str) -> String {
    format!("{indent}_ = sum(math.sqrt(i + random.random()) for i in range(100))\n")
}

/// A checksum-mismatch report that dumps a fake core file.
pub fn checksum_dump(indent: &str, expected: &str, outcome_var: &str, session_var: &str) -> String {
    format!(
        "{indent}print(f\"Quantum desynchronization error. Checksum mismatch. Expected '{expected}', got '{{{outcome_var}}}'.\")\n\
         {indent}print(\"Dumping quantum core state to 'core_dump.qdat' for analysis.\")\n\
         {indent}time.sleep(random.uniform(0.5, 1.5))\n\
         {indent}with open(\"core_dump.qdat\", \"w\") as f:\n\
         {indent}    f.write(f\"TIMESTAMP: {{datetime.datetime.now().isoformat()}}\\n\")\n\
         {indent}    f.write(f\"SESSION: {{{session_var}}}\\n\")\n\
         {indent}    f.write(\"STATUS: FATAL_Q_DESYNC\\n\")\n\
         {indent}    f.write(\"EXPECTED: {expected}\\n\")\n\
         {indent}    f.write(f\"RECEIVED: {{{outcome_var}}}\\n\")\n\
         {indent}    f.write(\"-- END OF DUMP --\\n\")\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qobf_compile::seed::seeded_rng;

    #[test]
    fn test_identifier_shape() {
        let mut decoys = DecoyGenerator::new(seeded_rng(1));
        let id = decoys.identifier("func");
        let (prefix, suffix) = id.split_once('_').unwrap();
        assert_eq!(prefix, "func");
        assert_eq!(suffix.len(), IDENTIFIER_LEN);
        assert!(suffix.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_identifiers_unique() {
        let mut decoys = DecoyGenerator::new(seeded_rng(1));
        let ids: FxHashSet<String> = (0..500).map(|_| decoys.identifier("v")).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_reproducible() {
        let mut a = DecoyGenerator::new(seeded_rng(7));
        let mut b = DecoyGenerator::new(seeded_rng(7));
        assert_eq!(a.helper_function(), b.helper_function());
        assert_eq!(a.assignment("    "), b.assignment("    "));
    }

    #[test]
    fn test_helper_function_is_indented() {
        let code = DecoyGenerator::new(seeded_rng(3)).helper_function();
        let lines: Vec<&str> = code.lines().collect();
        assert!(lines[0].starts_with("def func_"));
        assert!(lines[1..].iter().all(|l| l.starts_with("    ")));
    }

    #[test]
    fn test_checksum_dump_mentions_expected() {
        let body = checksum_dump("        ", "01", "dsa_x", "ctx_y");
        assert!(body.contains("Expected '01', got '{dsa_x}'"));
        assert!(body.contains("core_dump.qdat"));
        assert!(body.lines().all(|l| l.starts_with("        ")));
    }
}

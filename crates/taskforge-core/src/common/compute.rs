//! Builtin task computations and the executor seam.
//!
//! The dispatcher core treats task execution as opaque: a worker hands a
//! [`TaskKind`] and its parameter to a [`TaskExecutor`] and forwards whatever
//! text comes back. [`BuiltinExecutor`] supplies the three stock computations
//! (prime counting, prime-divisor counting, anagram enumeration); tests swap
//! in their own executors to observe dispatch behavior without doing real
//! work.

use crate::types::TaskKind;

/// Pure task-computation function used by each worker.
///
/// Implementations must be deterministic: result routing and the termination
/// protocol both assume `execute` returns exactly once per task and never
/// fails. Unknown task kinds are answered, not rejected.
pub trait TaskExecutor: Send + 'static {
    fn execute(&self, kind: &TaskKind, param: &str) -> String;
}

/// The stock computations shipped with the dispatcher.
#[derive(Debug, Default, Clone)]
pub struct BuiltinExecutor;

impl TaskExecutor for BuiltinExecutor {
    fn execute(&self, kind: &TaskKind, param: &str) -> String {
        match kind {
            TaskKind::Primes => {
                let n = parse_number(param);
                format!("Found {} primes in the first {n} numbers.", count_primes(n))
            }
            TaskKind::PrimeDivisors => {
                let n = parse_number(param);
                format!("Found {} prime divisors of {n}.", count_prime_divisors(n))
            }
            TaskKind::Anagrams => permutations(param).join("\n"),
            TaskKind::Unknown(keyword) => format!("Unknown task: {keyword}"),
        }
    }
}

/// atoi-style leniency: an unparsable parameter counts as zero.
fn parse_number(param: &str) -> u64 {
    param.parse().unwrap_or(0)
}

fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Number of primes in `1..=n`.
pub fn count_primes(n: u64) -> u64 {
    (1..=n).filter(|&i| is_prime(i)).count() as u64
}

/// Number of distinct prime divisors of `n`.
pub fn count_prime_divisors(n: u64) -> u64 {
    (2..=n).filter(|&i| n % i == 0 && is_prime(i)).count() as u64
}

/// All positional permutations of `word`, in recursive-swap order.
///
/// Repeated letters are NOT deduplicated: `"aa"` yields `aa` twice, one entry
/// per position arrangement.
pub fn permutations(word: &str) -> Vec<String> {
    let mut chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    let last = chars.len() - 1;
    let mut out = Vec::new();
    permute_rec(&mut chars, 0, last, &mut out);
    out
}

fn permute_rec(chars: &mut [char], start: usize, end: usize, out: &mut Vec<String>) {
    if start == end {
        out.push(chars.iter().collect());
        return;
    }
    for i in start..=end {
        chars.swap(start, i);
        permute_rec(chars, start + 1, end, out);
        chars.swap(start, i);
    }
}

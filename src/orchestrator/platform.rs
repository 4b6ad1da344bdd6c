use std::fmt;

/// Known applicant-tracking platforms, detected from the page URL.
/// Detection only tunes retry budgets and user guidance; every platform
/// goes through the same scan and fill pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ashby,
    Greenhouse,
    Lever,
    Workday,
    Generic,
}

impl Platform {
    pub fn detect(url: &str) -> Self {
        let u = url.to_lowercase();
        if u.contains("ashbyhq.com") || u.contains("ashby") {
            Platform::Ashby
        } else if u.contains("greenhouse.io") || u.contains("greenhouse") {
            Platform::Greenhouse
        } else if u.contains("lever.co") {
            Platform::Lever
        } else if u.contains("myworkday") || u.contains("workday") {
            Platform::Workday
        } else {
            Platform::Generic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Ashby => "Ashby",
            Platform::Greenhouse => "Greenhouse",
            Platform::Lever => "Lever",
            Platform::Workday => "Workday",
            Platform::Generic => "this",
        }
    }

    /// Remediation hint shown when a run finds no fields at all.
    pub fn guidance(&self) -> &'static str {
        match self {
            Platform::Ashby => {
                "Click the \"Apply for this job\" button first so the application form is visible, then retry."
            }
            Platform::Workday => {
                "Sign in and open the application step with the actual form before retrying."
            }
            _ => "Scroll to the application form or click Apply first, then retry.",
        }
    }

    /// Scan retry budget. Ashby renders its form late inside a modal, so
    /// it gets a longer budget with slower ramping.
    pub fn scan_policy(&self) -> RetryPolicy {
        match self {
            Platform::Ashby => RetryPolicy::linear(8, 1000),
            _ => RetryPolicy::linear(5, 500),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// delay = attempt * base
    Linear,
    /// delay = base * 2^(attempt - 1)
    Exponential,
}

/// Attempt budget plus the delay schedule between attempts. Attempt
/// numbers are 1-based; the delay is what to wait after that attempt
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base_delay_ms: u64) -> Self {
        RetryPolicy { max_attempts, base_delay_ms, backoff: Backoff::Linear }
    }

    pub fn exponential(max_attempts: u32, base_delay_ms: u64) -> Self {
        RetryPolicy { max_attempts, base_delay_ms, backoff: Backoff::Exponential }
    }

    pub fn delay_ms(&self, attempt: u32) -> u64 {
        match self.backoff {
            Backoff::Linear => self.base_delay_ms * attempt as u64,
            Backoff::Exponential => {
                self.base_delay_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(20))
            }
        }
    }
}

/// Backoff for transient mapping-backend failures (overload, quota).
pub fn ai_transient_policy() -> RetryPolicy {
    RetryPolicy::exponential(5, 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ashby_gets_the_long_budget() {
        let policy = Platform::detect("https://jobs.ashbyhq.com/acme/role").scan_policy();
        assert_eq!(policy.max_attempts, 8);
        assert_eq!(policy.delay_ms(1), 1000);
        assert_eq!(policy.delay_ms(4), 4000, "linear ramp scales with attempt number");
    }

    #[test]
    fn unknown_hosts_get_the_default_budget() {
        let policy = Platform::detect("https://careers.example.com/jobs/42").scan_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_ms(2), 1000);
    }

    #[test]
    fn exponential_backoff_doubles() {
        let policy = ai_transient_policy();
        assert_eq!(policy.delay_ms(1), 1000);
        assert_eq!(policy.delay_ms(2), 2000);
        assert_eq!(policy.delay_ms(3), 4000);
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert_eq!(Platform::detect("https://Jobs.AshbyHQ.com/x"), Platform::Ashby);
        assert_eq!(Platform::detect("https://boards.greenhouse.io/x"), Platform::Greenhouse);
        assert_eq!(Platform::detect("https://jobs.lever.co/x"), Platform::Lever);
    }
}

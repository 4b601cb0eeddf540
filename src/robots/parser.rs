use robotstxt::DefaultMatcher;

/// A server-declared request rate: `requests` per `seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRate {
    pub requests: u32,
    pub seconds: u32,
}

#[derive(Debug, Clone, Default)]
struct AgentGroup {
    agents: Vec<String>,
    crawl_delay: Option<f64>,
    request_rate: Option<RequestRate>,
}

/// Parsed robots.txt data for one origin.
///
/// Allow/deny matching delegates to the robotstxt crate; the rate directives
/// (Crawl-delay, Request-rate) and Sitemap lines are parsed here, since the
/// matcher does not expose them.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
    allow_all: bool,
    groups: Vec<AgentGroup>,
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        let mut groups: Vec<AgentGroup> = Vec::new();
        let mut sitemaps = Vec::new();
        let mut in_agent_run = false;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                in_agent_run = false;
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines share one group
                    if !in_agent_run {
                        groups.push(AgentGroup::default());
                        in_agent_run = true;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "crawl-delay" => {
                    in_agent_run = false;
                    if let (Some(group), Ok(delay)) = (groups.last_mut(), value.parse::<f64>()) {
                        group.crawl_delay = Some(delay);
                    }
                }
                "request-rate" => {
                    in_agent_run = false;
                    if let (Some(group), Some(rate)) = (groups.last_mut(), parse_rate(value)) {
                        group.request_rate = Some(rate);
                    }
                }
                "sitemap" => {
                    in_agent_run = false;
                    sitemaps.push(value.to_string());
                }
                _ => {
                    in_agent_run = false;
                }
            }
        }

        Self {
            content: content.to_string(),
            allow_all: false,
            groups,
            sitemaps,
        }
    }

    /// Creates a permissive ruleset that allows everything.
    ///
    /// Used as the fail-open default when robots.txt cannot be fetched or
    /// parsed.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
            groups: Vec::new(),
            sitemaps: Vec::new(),
        }
    }

    /// Checks whether a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// The crawl delay in seconds declared for this user agent, if any.
    ///
    /// A group naming the agent specifically wins over the wildcard group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        self.lookup(user_agent, |g| g.crawl_delay)
    }

    /// The request rate declared for this user agent, if any
    pub fn request_rate(&self, user_agent: &str) -> Option<RequestRate> {
        self.lookup(user_agent, |g| g.request_rate)
    }

    /// Sitemap URLs declared in this robots.txt
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    fn lookup<T: Copy>(&self, user_agent: &str, field: impl Fn(&AgentGroup) -> Option<T>) -> Option<T> {
        let normalized = user_agent.to_lowercase();
        let mut wildcard = None;

        for group in &self.groups {
            let value = match field(group) {
                Some(v) => v,
                None => continue,
            };
            if group.agents.iter().any(|a| a != "*" && normalized.contains(a.as_str())) {
                return Some(value);
            }
            if group.agents.iter().any(|a| a == "*") {
                wildcard = Some(value);
            }
        }

        wildcard
    }
}

fn parse_rate(value: &str) -> Option<RequestRate> {
    let (requests, seconds) = value.split_once('/')?;
    Some(RequestRate {
        requests: requests.trim().parse().ok()?,
        seconds: seconds.trim().parse().ok()?,
    })
}

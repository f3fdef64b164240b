const MOBILE_MARKERS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}

pub const ACTION_DISMISS: &str = "dismiss-advisory";

/// Startup banner telling desktop users the app is built for phones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileAdvisory {
    visible: bool,
}

impl MobileAdvisory {
    pub fn for_user_agent(user_agent: &str) -> Self {
        Self {
            visible: !is_mobile_user_agent(user_agent),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn render(&self) -> Option<String> {
        self.visible.then(|| {
            format!(
                "<div class=\"advisory\" role=\"alertdialog\"><h2>Notice</h2>\
                 <p>This app is optimized for mobile devices. For the best experience, open it on your smartphone.</p>\
                 <button type=\"button\" data-action=\"{ACTION_DISMISS}\">Got it</button></div>"
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mobile_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; ANDROID 14)"));
        assert!(!is_mobile_user_agent("Mozilla/5.0 (X11; Linux x86_64)"));
    }

    #[test]
    fn desktop_sees_banner_until_dismissed() {
        let mut banner = MobileAdvisory::for_user_agent("Mozilla/5.0 (Windows NT 10.0)");
        assert!(banner.render().is_some());
        banner.dismiss();
        assert!(!banner.is_visible());
        assert!(banner.render().is_none());
        assert!(MobileAdvisory::for_user_agent("iPad").render().is_none());
    }
}

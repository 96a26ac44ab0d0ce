//! Fixed tables compiled into the application: gifts, themes, tracks and the
//! decline message pool. Both the store (for validation) and the client read
//! from here.

pub const GIFT_OPTIONS: &[&str] = &[
    "🌹 Red Rose Bouquet",
    "🍫 Luxury Chocolate Box",
    "🧸 Cuddly Teddy Bear",
    "💝 Heart Locket",
    "🎵 Love Song Dedication",
    "✨ Star Named After You",
    "💌 Love Letter Collection",
    "🎪 Romantic Date Voucher",
    "🌟 Promise Ring",
    "🎭 Theater Tickets",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: [&'static str; 2],
    pub image: &'static str,
}

pub const THEMES: &[Theme] = &[
    Theme {
        id: "classic_romance",
        name: "Classic Romance",
        colors: ["#FFE4E6", "#FDA4AF"],
        image: "https://images.unsplash.com/photo-1518199266791-5375a83190b7?auto=format&fit=crop&w=800",
    },
    Theme {
        id: "midnight_passion",
        name: "Midnight Passion",
        colors: ["#312E81", "#831843"],
        image: "https://images.unsplash.com/photo-1534796636912-3b95b3ab5986?auto=format&fit=crop&w=800",
    },
    Theme {
        id: "enchanted_garden",
        name: "Enchanted Garden",
        colors: ["#ECFDF5", "#FCE7F3"],
        image: "https://images.unsplash.com/photo-1465146344425-f00d5f5c8f07?auto=format&fit=crop&w=800",
    },
    Theme {
        id: "golden_sunset",
        name: "Golden Sunset",
        colors: ["#FEF3C7", "#FEE2E2"],
        image: "https://images.unsplash.com/photo-1523438885200-e635ba2c371e?auto=format&fit=crop&w=800",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub id: &'static str,
    pub path: &'static str,
    /// Clip length in whole seconds.
    pub duration: u32,
    pub title: &'static str,
    pub emoji: &'static str,
    pub artist: Option<&'static str>,
}

pub const TRACKS: &[Track] = &[
    Track {
        id: "midnight_glow",
        path: "/midnight_glow.mp3",
        duration: 3 * 60 + 13,
        title: "Midnight Glow",
        emoji: "🌙",
        artist: Some("Eternal Garden"),
    },
    Track {
        id: "midnight_rain",
        path: "/midnight_rain.mp3",
        duration: 3 * 60 + 3,
        title: "Midnight Rain",
        emoji: "🌧️",
        artist: Some("Eternal Garden"),
    },
    Track {
        id: "under_the_moonlight",
        path: "/under_the_moonlight.mp3",
        duration: 3 * 60 + 13,
        title: "Under the Moonlight",
        emoji: "🌌",
        artist: Some("Eternal Garden"),
    },
    Track {
        id: "starry_whisper",
        path: "/starry_whisper.mp3",
        duration: 3 * 60 + 6,
        title: "Starry Whisper",
        emoji: "🌠",
        artist: Some("Eternal Garden"),
    },
    Track {
        id: "whispering_secrets",
        path: "/whispering_secrets.mp3",
        duration: 3 * 60 + 52,
        title: "Whispering Secrets",
        emoji: "🤫",
        artist: None,
    },
    Track {
        id: "whispers_in_the_dark",
        path: "/whispers_in_the_dark.mp3",
        duration: 4 * 60,
        title: "Whispers in the Dark",
        emoji: "🌑",
        artist: Some("Eternal Garden"),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionMessage {
    pub title: &'static str,
    pub description: &'static str,
}

const fn rejection(title: &'static str, description: &'static str) -> RejectionMessage {
    RejectionMessage { title, description }
}

/// Decline responses in the order they are shown. Repeats are part of the
/// rotation.
pub const REJECTION_MESSAGES: &[RejectionMessage] = &[
    rejection("Wait, what?!", "Love just took emotional damage 💔"),
    rejection("Bruh...", "Cupid just rage-quit. Thanks a lot. 😤"),
    rejection("404: Rejection Not Found", "Love.exe has stopped responding. Restart required. 💕"),
    rejection("Denied!", "Your application to avoid love has been rejected. 📝❌"),
    rejection("Think again...", "Your heart has been flagged for suspicious activity. ❤️🚨"),
    rejection("Whoa there!", "You’re rejecting love? Is your WiFi okay? 📶❌"),
    rejection("Rejection Overruled!", "Love is persistent, like a pop-up ad you can't close. 😆"),
    rejection("Mission Failed!", "We'll get 'em next time… or not. 😭💔"),
    rejection("Error 502: Love Gateway Timeout", "Love tried reaching you but got ghosted. 👻"),
    rejection("Heart.exe crashed!", "Reboot your emotions and try again. 🔄❤️"),
    rejection("Nice try!", "You can’t run from love. It's got GPS. 📍💘"),
    rejection("Denied by the Universe", "Even the stars are rooting for this one. 🌟✨"),
    rejection("Oops...", "Your rejection has been declined due to lack of romance points. 😜"),
    rejection("Why tho?", "Even AI thinks this is a bad idea. 🤖💔"),
    rejection("Yikes!", "This rejection has been recorded for training purposes. 📼"),
    rejection("L + Ratio", "You just took an emotional L. 📉💀"),
    rejection("Bruh moment", "This one is going in my cringe compilation. 📸"),
    rejection("Denied with Extreme Prejudice", "The love gods are not happy with you. 😠💖"),
    rejection("Love Jail 🚔", "You’re under arrest for crimes against romance! 💘🔗"),
    rejection("Rejection Rejected!", "You just got rejected for rejecting love. 🔄❤️"),
    rejection("Error 404: Love Not Found", "Love tried reaching you but got a 404. 💔🚫"),
    rejection("Denied!", "You just got friend-zoned by love. 😬🚫"),
    rejection("Love.exe has stopped working", "Your heart has crashed. Please restart. 💔🔄"),
    rejection("Nope!", "Love just got ghosted by you. 👻💔"),
    rejection("Rejected!", "Your heart has been returned to sender. 📦🔄"),
    rejection("Love Denied!", "Your heart has been blocked by love. 🚫❤️"),
    rejection("Error 403: Forbidden Love", "Your heart has been banned from love. 🚫❤️"),
    rejection("Rejected by Cupid", "Cupid just swiped left on your heart. 💔👼"),
    rejection("Rejection Rejected!", "You just got rejected for rejecting love. 🔄❤️"),
    rejection("Denied!", "You just got friend-zoned by love. 😬🚫"),
    rejection("Love.exe has stopped working", "Your heart has crashed. Please restart. 💔🔄"),
    rejection("Nope!", "Love just got ghosted by you. 👻💔"),
    rejection("Rejected!", "Your heart has been returned to sender. 📦🔄"),
    rejection("Love Denied!", "Your heart has been blocked by love. 🚫❤️"),
    rejection("Error 403: Forbidden Love", "Your heart has been banned from love. 🚫❤️"),
    rejection("Rejected by my Heart", "Your heart has been returned to sender. 📦❤️"),
    rejection("Love Denied!", "Your heart has been blocked by love. 🚫❤️"),
    rejection("Error 403: Forbidden Love", "Your heart has been banned from love. 🚫❤️"),
    rejection("Rejected by Cupid", "Cupid just swiped left on your heart. 💔👼"),
    rejection("Rejection Rejected!", "You just got rejected for rejecting love. 🔄❤️"),
    rejection("Denied!", "You just got friend-zoned by love. 😬🚫"),
    rejection("Love.exe has stopped working", "Your heart has crashed. Please restart. 💔🔄"),
    rejection("Nope!", "Love just got ghosted by you. 👻💔"),
    rejection("Rejected!", "Your heart has been returned to sender. 📦🔄"),
    rejection("Love Denied!", "Your heart has been blocked by love. 🚫❤️"),
    rejection("Error 403: Forbidden Love", "Your heart has been banned from love. 🚫❤️"),
    rejection("Rejected by Cupid", "Cupid just swiped left on your heart. 💔👼"),
    rejection("Rejection Rejected!", "You just got rejected for rejecting love. 🔄❤️"),
    rejection("Denied!", "You just got friend-zoned by love. 😬🚫"),
    rejection("Love.exe has stopped working", "Your heart has crashed. Please restart. 💔🔄"),
    rejection("Nope!", "Love just got ghosted by you. 👻💔"),
    rejection("Rejected!", "Your heart has been returned to sender. 📦🔄"),
    rejection("Love Denied!", "Your heart has been blocked by love. 🚫❤️"),
];

pub fn is_gift(value: &str) -> bool {
    GIFT_OPTIONS.contains(&value)
}

pub fn theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

pub fn track(id: &str) -> Option<&'static Track> {
    TRACKS.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique() {
        let themes: HashSet<_> = THEMES.iter().map(|t| t.id).collect();
        assert_eq!(themes.len(), THEMES.len());
        let tracks: HashSet<_> = TRACKS.iter().map(|t| t.id).collect();
        assert_eq!(tracks.len(), TRACKS.len());
        let gifts: HashSet<_> = GIFT_OPTIONS.iter().collect();
        assert_eq!(gifts.len(), GIFT_OPTIONS.len());
    }

    #[test]
    fn lookups() {
        assert_eq!(theme("golden_sunset").map(|t| t.name), Some("Golden Sunset"));
        assert_eq!(track("midnight_glow").map(|t| t.duration), Some(193));
        assert!(track("whispering_secrets").unwrap().artist.is_none());
        assert!(theme("neon").is_none());
        assert!(is_gift("🌹 Red Rose Bouquet"));
        assert!(!is_gift("Red Rose Bouquet"));
    }

    #[test]
    fn rejection_rotation_keeps_its_repeats() {
        assert_eq!(REJECTION_MESSAGES.len(), 53);
        assert_eq!(REJECTION_MESSAGES[0].title, "Wait, what?!");
        assert_eq!(REJECTION_MESSAGES[35].title, "Rejected by my Heart");
        assert_eq!(REJECTION_MESSAGES[52].title, "Love Denied!");
        let titles: HashSet<_> = REJECTION_MESSAGES.iter().map(|m| m.title).collect();
        assert!(titles.len() < REJECTION_MESSAGES.len());
        assert!(REJECTION_MESSAGES.iter().all(|m| !m.title.is_empty() && !m.description.is_empty()));
    }
}

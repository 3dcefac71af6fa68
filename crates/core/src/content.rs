//! Static content: the practice paths and the journaling prompt packs.
//!
//! Both tables are compiled into the binary and never change at runtime. Prompt pack keys
//! are path ids, so every pack entry must name a path in [`PATHS`].

use serde::Serialize;

/// A themed four-week practice plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticePath {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Primary practice category.
    pub main_pillar: &'static str,
    /// One or two supporting categories, alternated week by week.
    pub supports: &'static [&'static str],
    /// The path's own reflection prompts, used when a pack has nothing for it.
    pub weekly_prompts: &'static [&'static str],
}

/// A named collection of journaling prompts indexed by path id and week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPack {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub prompts_by_path_id: &'static [(&'static str, &'static [&'static str])],
}

impl PromptPack {
    /// Prompts this pack holds for `path_id`, one nominal slot per week.
    pub fn prompts_for(&self, path_id: &str) -> Option<&'static [&'static str]> {
        self.prompts_by_path_id
            .iter()
            .find(|(id, _)| *id == path_id)
            .map(|(_, prompts)| *prompts)
    }
}

pub const PATHS: &[PracticePath] = &[
    PracticePath {
        id: "asana",
        name: "Aliven Asana Path",
        main_pillar: "Yoga",
        supports: &["Meditation", "Movement Medicine"],
        description: "A yoga-led path focused on deepening asana practice through awareness, presence, and embodied listening.",
        weekly_prompts: &[
            "When I move through asana with awareness, what do I notice about my body today without trying to change anything?",
            "Where do I feel effort or holding in my practice, and what happens when I allow a little more softness?",
            "How does my relationship to my body shift when I listen instead of push?",
            "What has my asana practice taught me about balance between stability and freedom in my life?",
        ],
    },
    PracticePath {
        id: "movement-medicine",
        name: "Aliven Movement Medicine Path",
        main_pillar: "Dance & Movement Therapy",
        supports: &["Yin Yoga", "Meditation"],
        description: "An expressive, somatic path guided by intuitive movement, sensation, and emotional awareness.",
        weekly_prompts: &[
            "What sensations, emotions, or impulses are asking to be expressed through my body right now?",
            "What shifts when I allow my body to move freely, without trying to make it look or feel a certain way?",
            "When I give myself permission to follow movement instead of controlling it, what do I discover about myself?",
            "How has moving from sensation and feeling influenced how I relate to myself this week?",
        ],
    },
    PracticePath {
        id: "stillness",
        name: "Aliven Stillness & Clarity Path",
        main_pillar: "Meditation & Pranayama",
        supports: &["Movement Medicine", "Yin Yoga"],
        description: "A meditation-led path focused on cultivating clarity, inner steadiness, and nervous system regulation.",
        weekly_prompts: &[
            "When I give myself time to be still, what do I notice about my inner state right now?",
            "What patterns of mind become visible when I slow down and observe without judgment?",
            "How does clarity show up when I allow space instead of searching for answers?",
            "What has this practice of stillness revealed about how I relate to my inner world?",
        ],
    },
    PracticePath {
        id: "strength",
        name: "Aliven Rooted Strength Path",
        main_pillar: "Strength (Pilates-based)",
        supports: &["Yoga"],
        description: "A strength-led path rooted in Pilates principles, emphasizing stability, alignment, and mindful control.",
        weekly_prompts: &[
            "How does building physical strength feel in my body right now?",
            "Where do I feel more supported or capable in my body as I move through strength practices?",
            "How does physical strength influence my confidence or boundaries in daily life?",
            "What has this practice taught me about creating stability while allowing ease?",
        ],
    },
];

pub const DEFAULT_PROMPT_PACK: PromptPack = PromptPack {
    id: "default",
    label: "Default Aliven Rhythm",
    prompts_by_path_id: &[
        (
            "asana",
            &[
                "Where can I soften without losing structure?",
                "What does steady effort feel like in my body?",
                "Where am I holding unnecessary tension?",
                "How can I support myself with consistency this week?",
            ],
        ),
        (
            "stillness",
            &[
                "What am I noticing when I slow down?",
                "What wants to be felt but not fixed?",
                "Where can I allow more space in my day?",
                "What happens when I don\u{2019}t rush myself?",
            ],
        ),
        (
            "strength",
            &[
                "Where do I feel stable and strong right now?",
                "What kind of strength do I actually need today?",
                "Where can I choose progress over pressure?",
                "How can I meet my edge with respect?",
            ],
        ),
        (
            "movement-medicine",
            &[
                "What sensations, emotions, or impulses want expression?",
                "Where do I feel stuck, and what movement might unstick me?",
                "What happens when I let my body lead for 2 minutes?",
                "What do I discover when I move without performing?",
            ],
        ),
    ],
};

static PROMPT_PACKS: &[PromptPack] = &[DEFAULT_PROMPT_PACK];

pub fn paths() -> &'static [PracticePath] {
    PATHS
}

pub fn find_path(id: &str) -> Option<&'static PracticePath> {
    PATHS.iter().find(|p| p.id == id)
}

pub fn default_prompt_pack() -> &'static PromptPack {
    &PROMPT_PACKS[0]
}

pub fn find_prompt_pack(id: &str) -> Option<&'static PromptPack> {
    PROMPT_PACKS.iter().find(|p| p.id == id)
}

//! Insight generation and ranking
//!
//! Insights come from a fixed, ordered list of rules evaluated against the
//! metrics computed for one window. The generated list is then ranked by
//! priority, a hero insight is picked and the list is capped.
//!
//! Rule order matters: it is the tie-break between insights of equal priority.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::cycle::{CycleSummary, CycleTrend};
use crate::metrics::{CategorySummary, SymptomSummary};
use crate::norm::{compare_to_norm, NormComparison};
use crate::ranker::{top_symptoms, RankedSymptom};
use crate::streak::next_milestone;
use crate::trend::{Trend, TrendSummary};
use crate::types::{EnergyLevel, Mood, SleepQuality, Symptom};
use crate::window::Window;

/// Share of poor nights (percent) that triggers a sleep warning
pub const POOR_SLEEP_WARNING_PCT: f64 = 40.0;
/// Share of good nights (percent) that earns a sleep encouragement
pub const GOOD_SLEEP_PCT: f64 = 60.0;
/// Share of negative moods (percent) above which mood support is suggested
pub const NEGATIVE_MOOD_WARNING_PCT: f64 = 40.0;
/// Share of positive moods (percent) that earns a mood encouragement
pub const POSITIVE_MOOD_PCT: f64 = 70.0;
/// Share of high-energy entries (percent) below which energy advice is given
pub const LOW_ENERGY_PCT: f64 = 20.0;
/// Share of hot-flash entries with disturbed sleep (percent) above which the
/// two are reported as linked
pub const LINKED_SLEEP_PCT: f64 = 50.0;

/// Minimum streak that earns a streak encouragement
const STREAK_ENCOURAGEMENT_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Pattern,
    Recommendation,
    Warning,
    Encouragement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Sleep,
    Mood,
    Energy,
    Symptoms,
    Cycle,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight, higher first
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Concrete next steps attached to an insight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionableSteps {
    pub relief_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub who_to_contact: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions_to_ask: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lifestyle_changes: Vec<String>,
}

impl ActionableSteps {
    fn new(
        relief_methods: &[&str],
        who_to_contact: &[&str],
        questions_to_ask: &[&str],
        lifestyle_changes: &[&str],
    ) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            relief_methods: owned(relief_methods),
            who_to_contact: owned(who_to_contact),
            questions_to_ask: owned(questions_to_ask),
            lifestyle_changes: owned(lifestyle_changes),
        }
    }
}

/// One human-readable insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Stable for the same rule, window and reference date
    pub id: Uuid,
    pub kind: InsightKind,
    pub category: InsightCategory,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub actionable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actionable_steps: Option<ActionableSteps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_to_norm: Option<NormComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl Insight {
    fn titled(mut self, title: &str, message: &str) -> Self {
        self.title = title.to_string();
        self.message = message.to_string();
        self
    }

    fn with_steps(mut self, steps: ActionableSteps) -> Self {
        self.actionable = true;
        self.actionable_steps = Some(steps);
        self
    }

    fn with_comparison(mut self, comparison: Option<NormComparison>) -> Self {
        self.comparison_to_norm = comparison;
        self
    }

    fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }
}

/// Ranked, capped insights with the hero first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    /// The featured insight; always `insights[0]` when present
    pub hero: Option<Insight>,
    pub insights: Vec<Insight>,
}

/// Everything the rules look at for one window
#[derive(Debug, Clone, Copy)]
pub struct Metrics<'a> {
    pub window: Window,
    pub today: NaiveDate,
    /// No daily and no cycle entries at all, in any window
    pub new_user: bool,
    pub streak: u32,
    pub entries_in_window: u32,
    pub sleep: &'a CategorySummary<SleepQuality>,
    pub mood: &'a CategorySummary<Mood>,
    pub energy: &'a CategorySummary<EnergyLevel>,
    pub symptoms: &'a SymptomSummary,
    pub ranked_symptoms: &'a [RankedSymptom],
    /// Percent of hot-flash entries that also report disturbed sleep
    pub hot_flash_sleep_overlap: Option<f64>,
    pub trends: &'a TrendSummary,
    pub cycle: &'a CycleSummary,
}

/// Deterministic insight id for a rule firing
pub fn insight_id(rule: &str, window: Window, today: NaiveDate) -> Uuid {
    let name = format!("{rule}:{window}:{today}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Runs the insight rules
pub struct InsightGenerator<'c> {
    config: &'c EngineConfig,
}

impl<'c> InsightGenerator<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Generate, rank and cap
    pub fn report(&self, metrics: &Metrics<'_>) -> InsightReport {
        rank_insights(self.generate(metrics), self.config.max_insights)
    }

    /// Every insight the rules produce, in rule order
    pub fn generate(&self, m: &Metrics<'_>) -> Vec<Insight> {
        let mut out = Vec::new();

        if m.new_user {
            out.push(
                draft(m, "welcome", InsightKind::Encouragement, InsightCategory::General, Priority::Low)
                    .titled(
                        "Welcome to your journal",
                        "Log your first morning or evening check-in and your personal insights will start to appear here.",
                    )
                    .with_steps(ActionableSteps::new(
                        &["Log a daily check-in", "Track your cycle"],
                        &[],
                        &[],
                        &[],
                    )),
            );
            debug!(rule = "welcome", "New user, skipping remaining rules");
            return out;
        }

        self.streak_rules(m, &mut out);
        self.symptom_rules(m, &mut out);
        self.sleep_rules(m, &mut out);
        self.mood_rules(m, &mut out);
        self.energy_rules(m, &mut out);
        self.cycle_rules(m, &mut out);

        if out.is_empty() {
            out.push(
                draft(m, "keep_logging", InsightKind::Encouragement, InsightCategory::General, Priority::Low)
                    .titled(
                        "Keep logging",
                        "Nothing stands out in this period yet. A few more check-ins will make your patterns clearer.",
                    ),
            );
        }

        for insight in &out {
            debug!(title = %insight.title, priority = ?insight.priority, "Insight generated");
        }
        out
    }

    fn streak_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        if m.streak == 0 {
            out.push(
                draft(m, "streak_start", InsightKind::Encouragement, InsightCategory::General, Priority::Medium)
                    .titled(
                        "Log today to keep your streak",
                        "You haven't checked in today. A short entry keeps your insights accurate.",
                    ),
            );
        } else if m.streak >= STREAK_ENCOURAGEMENT_DAYS {
            let message = match next_milestone(m.streak) {
                Some(milestone) => format!(
                    "You've logged {} days in a row. {} more to reach {} days.",
                    m.streak,
                    milestone - m.streak,
                    milestone
                ),
                None => format!(
                    "You've logged {} days in a row and passed every milestone.",
                    m.streak
                ),
            };
            out.push(
                draft(m, "streak_milestone", InsightKind::Encouragement, InsightCategory::General, Priority::Low)
                    .titled(&format!("{}-day streak", m.streak), &message),
            );
        }
    }

    fn symptom_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        let top = top_symptoms(m.ranked_symptoms, self.config.top_symptoms);

        for (position, ranked) in top.iter().enumerate() {
            if ranked.count < self.config.symptom_count_threshold {
                continue;
            }
            let label = ranked.symptom.label();
            let title = if position == 0 {
                format!("{label}: your most frequent symptom")
            } else {
                format!("{label} keeps coming up")
            };
            let message = format!(
                "You reported {} in {} of {} entries ({:.0}%). {}",
                label.to_lowercase(),
                ranked.count,
                m.entries_in_window,
                ranked.percentage,
                symptom_advice(ranked.symptom)
            );
            let comparison = self
                .config
                .norms
                .symptom(ranked.symptom)
                .map(|norm| compare_to_norm(label, ranked.percentage, norm));

            out.push(
                draft(
                    m,
                    &format!("symptom:{}", ranked.symptom.as_str()),
                    InsightKind::Pattern,
                    InsightCategory::Symptoms,
                    Priority::High,
                )
                .titled(&title, &message)
                .with_steps(symptom_steps(ranked.symptom))
                .with_comparison(comparison),
            );
        }

        if let Some(overlap) = m.hot_flash_sleep_overlap.filter(|o| *o > LINKED_SLEEP_PCT) {
            out.push(
                draft(m, "linked:hot_flashes:sleep", InsightKind::Pattern, InsightCategory::Symptoms, Priority::Medium)
                    .titled(
                        "Hot flashes may be disturbing your sleep",
                        &format!(
                            "{overlap:.0}% of your hot flash entries also had a disturbed night. A cooler bedroom, no caffeine after noon and a fan by the bed can help."
                        ),
                    )
                    .with_steps(ActionableSteps::new(
                        &["Keep the bedroom cool", "Keep a fan by the bed"],
                        &[],
                        &[],
                        &["Avoid caffeine in the afternoon"],
                    )),
            );
        }

        if let Some(top) = m.trends.top_symptom {
            let label = top.symptom.label();
            let key = format!("symptom_trend:{}", top.symptom.as_str());
            match top.trend {
                Trend::Up => out.push(
                    draft(m, &key, InsightKind::Warning, InsightCategory::Symptoms, Priority::Medium)
                        .titled(
                            &format!("{label}: on the rise"),
                            &format!("{label} became more frequent in the second half of this period."),
                        )
                        .with_trend(Trend::Up),
                ),
                Trend::Down => out.push(
                    draft(m, &key, InsightKind::Encouragement, InsightCategory::Symptoms, Priority::Low)
                        .titled(
                            &format!("{label}: easing off"),
                            &format!("{label} became less frequent in the second half of this period."),
                        )
                        .with_trend(Trend::Down),
                ),
                Trend::Stable => {}
            }
        }
    }

    fn sleep_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        let Some(table) = m.sleep.table() else {
            return;
        };
        if table.total < self.config.min_category_samples {
            return;
        }

        let poor = table.percentage_of(SleepQuality::Poor);
        let good = table.percentage_of(SleepQuality::Good);
        if poor >= POOR_SLEEP_WARNING_PCT {
            let comparison = self
                .config
                .norms
                .symptom(Symptom::SleepIssues)
                .map(|norm| compare_to_norm("Poor nights", poor, norm));
            out.push(
                draft(m, "sleep:poor", InsightKind::Warning, InsightCategory::Sleep, Priority::High)
                    .titled(
                        "Your sleep needs attention",
                        &format!(
                            "{} of your {} nights were poor ({poor:.0}%). A steady bedtime, no screens before bed and a cool room can make a real difference.",
                            table.count_of(SleepQuality::Poor),
                            table.total
                        ),
                    )
                    .with_steps(ActionableSteps::new(
                        &["Keep a fixed bedtime and wake time", "Keep the bedroom cool and dark"],
                        &["Family doctor", "Sleep clinic"],
                        &["Could my sleep problems be related to menopause?"],
                        &["Avoid screens an hour before bed", "Limit caffeine and alcohol in the evening"],
                    ))
                    .with_comparison(comparison)
                    .with_trend(m.trends.sleep),
            );
        } else if good >= GOOD_SLEEP_PCT {
            out.push(
                draft(m, "sleep:good", InsightKind::Encouragement, InsightCategory::Sleep, Priority::Low)
                    .titled(
                        "You're sleeping well",
                        &format!("{good:.0}% of your nights were good. Keep doing what works for you."),
                    )
                    .with_trend(m.trends.sleep),
            );
        }
    }

    fn mood_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        if let Some(positive) = m.mood.positive_percentage() {
            if m.mood.total() >= self.config.min_category_samples {
                let negative = 100.0 - positive;
                if negative > NEGATIVE_MOOD_WARNING_PCT {
                    out.push(
                        draft(m, "mood:low", InsightKind::Warning, InsightCategory::Mood, Priority::High)
                            .titled(
                                "Your mood could use some support",
                                &format!(
                                    "{negative:.0}% of your check-ins had a low mood. That is common in this stage of life, and talking, activity or therapy can help."
                                ),
                            )
                            .with_steps(ActionableSteps::new(
                                &["Talk with someone you trust", "Take a daily walk outdoors"],
                                &["Family doctor", "Mental health professional"],
                                &["Could hormonal changes be affecting my mood?"],
                                &["Keep regular physical activity"],
                            )),
                    );
                } else if positive >= POSITIVE_MOOD_PCT {
                    out.push(
                        draft(m, "mood:positive", InsightKind::Encouragement, InsightCategory::Mood, Priority::Low)
                            .titled(
                                "Your mood is in a good place",
                                &format!("You felt calm or happy in {positive:.0}% of your check-ins."),
                            ),
                    );
                }
            }
        }

        match m.trends.mood {
            Trend::Up => out.push(
                draft(m, "mood_trend", InsightKind::Encouragement, InsightCategory::Mood, Priority::Low)
                    .titled("Your mood is lifting", "Your mood improved over the second half of this period.")
                    .with_trend(Trend::Up),
            ),
            Trend::Down => out.push(
                draft(m, "mood_trend", InsightKind::Warning, InsightCategory::Mood, Priority::Medium)
                    .titled("Your mood has dipped", "Your mood was lower in the second half of this period.")
                    .with_trend(Trend::Down),
            ),
            Trend::Stable => {}
        }
    }

    fn energy_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        let Some(table) = m.energy.table() else {
            return;
        };
        if table.total < self.config.min_category_samples {
            return;
        }
        let high = table.percentage_of(EnergyLevel::High);
        if high < LOW_ENERGY_PCT {
            out.push(
                draft(m, "energy:low", InsightKind::Recommendation, InsightCategory::Energy, Priority::Medium)
                    .titled(
                        "Your energy has been low",
                        &format!(
                            "Only {high:.0}% of your check-ins had high energy. Short walks, regular meals and enough water can help."
                        ),
                    )
                    .with_steps(ActionableSteps::new(
                        &["Take a short walk during the day", "Eat regular balanced meals"],
                        &[],
                        &[],
                        &["Drink enough water", "Keep a consistent sleep schedule"],
                    ))
                    .with_trend(m.trends.energy),
            );
        }
    }

    fn cycle_rules(&self, m: &Metrics<'_>, out: &mut Vec<Insight>) {
        let Some(stats) = m.cycle.stats() else {
            return;
        };

        if stats.is_irregular() {
            out.push(
                draft(m, "cycle:irregular", InsightKind::Pattern, InsightCategory::Cycle, Priority::Medium)
                    .titled(
                        "Your cycle is irregular",
                        "The gap between your periods varies a lot. That is common around menopause; keep noting related symptoms.",
                    )
                    .with_steps(ActionableSteps::new(
                        &["Keep a regular sleep schedule", "Note triggers such as stress or diet"],
                        &["Gynecologist"],
                        &["Is this irregularity expected at my stage?"],
                        &["Cut back on caffeine and alcohol in the evening"],
                    )),
            );
            return;
        }

        let message = match stats.trend {
            CycleTrend::Lengthening => {
                "The time between your periods is getting longer, which is common as menopause approaches. Report any unusually heavy bleeding."
            }
            CycleTrend::Shortening => {
                "The time between your periods is getting shorter, which is common in perimenopause. If bleeding is unusual, see a doctor."
            }
            CycleTrend::Irregular | CycleTrend::Stable => return,
        };
        out.push(
            draft(m, "cycle:trend", InsightKind::Pattern, InsightCategory::Cycle, Priority::Medium)
                .titled("Your cycle length is changing", message),
        );
    }
}

/// Rank by priority (stable), pick the hero, put it first and cap the list
pub fn rank_insights(generated: Vec<Insight>, max_insights: usize) -> InsightReport {
    if generated.is_empty() {
        return InsightReport::default();
    }

    let mut ranked = generated;
    ranked.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));

    // Within the top priority present, a comparison wins; otherwise the first
    let top = ranked[0].priority;
    let hero_index = ranked
        .iter()
        .position(|i| i.priority == top && i.comparison_to_norm.is_some())
        .unwrap_or(0);

    let hero = ranked.remove(hero_index);
    let mut insights = Vec::with_capacity(max_insights.min(ranked.len() + 1));
    insights.push(hero.clone());
    insights.extend(ranked);
    insights.truncate(max_insights.max(1));

    InsightReport {
        hero: Some(hero),
        insights,
    }
}

/// One-sentence advice for a symptom
pub fn symptom_advice(symptom: Symptom) -> &'static str {
    match symptom {
        Symptom::HotFlashes => "Dressing in layers, a portable fan and avoiding spicy food can help.",
        Symptom::NightSweats => "Light bedding and a cool bedroom can help.",
        Symptom::SleepIssues => "A steady sleep routine and a cool room can help.",
        Symptom::WokeUpNight => "Limiting fluids and screens before bed can help you sleep through.",
        Symptom::ConcentrationDifficulty => {
            "Mental activity, balanced meals and good sleep all matter."
        }
        Symptom::Pain => "Gentle exercise and stretching may ease it.",
        Symptom::Dryness => "Moisturizers and drinking enough water can help.",
        Symptom::Bloating => "Drinking water and cutting back on salt can help.",
        Symptom::SexualDesire => "Changes in desire are common and worth discussing openly.",
    }
}

/// Remedy lookup for a symptom
pub fn symptom_steps(symptom: Symptom) -> ActionableSteps {
    match symptom {
        Symptom::HotFlashes => ActionableSteps::new(
            &["Dress in layers", "Carry a portable fan", "Sip cold water"],
            &["Family doctor", "Gynecologist"],
            &["Are hormonal or non-hormonal treatments right for me?"],
            &["Avoid spicy food, caffeine and alcohol", "Keep the bedroom cool"],
        ),
        Symptom::NightSweats => ActionableSteps::new(
            &["Use light, breathable bedding", "Keep a change of nightwear nearby"],
            &["Family doctor"],
            &["Could my night sweats have another cause?"],
            &["Keep the bedroom cool", "Avoid alcohol in the evening"],
        ),
        Symptom::SleepIssues => ActionableSteps::new(
            &["Keep a fixed bedtime", "Try a relaxation routine before bed"],
            &["Family doctor", "Sleep clinic"],
            &["Would a sleep assessment help me?"],
            &["Avoid screens an hour before bed", "Limit caffeine after noon"],
        ),
        Symptom::WokeUpNight => ActionableSteps::new(
            &["Keep the room dark and quiet", "Try breathing exercises when you wake"],
            &["Family doctor"],
            &["Could night waking be linked to hot flashes?"],
            &["Limit fluids in the evening"],
        ),
        Symptom::ConcentrationDifficulty => ActionableSteps::new(
            &["Write lists and reminders", "Take short breaks during focused work"],
            &["Family doctor"],
            &["Could brain fog be related to menopause?"],
            &["Keep regular sleep", "Eat balanced meals"],
        ),
        Symptom::Pain => ActionableSteps::new(
            &["Gentle stretching", "Warm compresses"],
            &["Family doctor", "Physiotherapist"],
            &["Which pain relief is safe for me?"],
            &["Light daily exercise"],
        ),
        Symptom::Dryness => ActionableSteps::new(
            &["Use a moisturizer or lubricant"],
            &["Gynecologist"],
            &["Would a local treatment help with dryness?"],
            &["Drink enough water"],
        ),
        Symptom::Bloating => ActionableSteps::new(
            &["Eat smaller meals", "Take a walk after eating"],
            &["Family doctor"],
            &["Could my diet be causing the bloating?"],
            &["Drink water regularly", "Cut back on salt"],
        ),
        Symptom::SexualDesire => ActionableSteps::new(
            &["Talk openly with your partner"],
            &["Gynecologist", "Sex therapist"],
            &["Are changes in desire expected at my stage?"],
            &["Make time for rest and intimacy"],
        ),
    }
}

// A fresh insight for a rule; title and message are filled by `titled`
fn draft(
    m: &Metrics<'_>,
    rule: &str,
    kind: InsightKind,
    category: InsightCategory,
    priority: Priority,
) -> Insight {
    Insight {
        id: insight_id(rule, m.window, m.today),
        kind,
        category,
        priority,
        title: String::new(),
        message: String::new(),
        actionable: false,
        actionable_steps: None,
        comparison_to_norm: None,
        trend: None,
    }
}

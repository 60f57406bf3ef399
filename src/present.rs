//! Rendering of a `Report`: Chart.js radar payload, the browser page and a
//! terminal view.

use serde_json::{json, Value};

use crate::report::{Report, StatView};

pub const TITLE: &str = "ACE v4 Superhuman Tracker";
pub const UNVALIDATED_WARNING: &str = "⚠️ Niet gevalideerd - herhaal prestatie";
const CHART_JS_SRC: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

/// Chart.js radar `{data, options}` for the per-category levels.
pub fn radar_payload(report: &Report) -> Value {
    let labels: Vec<&str> = report.stats.iter().map(|s| s.category.name()).collect();
    let levels: Vec<u32> = report.stats.iter().map(|s| s.level).collect();
    json!({
        "type": "radar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Stat Levels",
                "data": levels,
                "backgroundColor": "rgba(34,211,238,0.3)",
                "borderColor": "#22d3ee",
                "borderWidth": 2,
            }],
        },
        "options": {
            "scales": {
                "r": {
                    "min": 0,
                    "max": 100,
                    "ticks": { "stepSize": 20, "color": "#fff" },
                    "grid": { "color": "#333" },
                    "angleLines": { "color": "#444" },
                    "pointLabels": { "color": "#fff", "font": { "size": 14 } },
                },
            },
            "plugins": { "legend": { "display": false } },
        },
    })
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

fn render_card(stat: &StatView, xp_step: u64) -> String {
    let warning = if stat.validated {
        String::new()
    } else {
        format!("      <p class=\"warn\">{}</p>\n", escape_html(UNVALIDATED_WARNING))
    };
    format!(
        concat!(
            "    <div class=\"card\">\n",
            "      <h3>{name}</h3>\n",
            "      <div class=\"bar\"><div class=\"fill\" style=\"width: {progress}%\"></div></div>\n",
            "      <p class=\"level\">Level {level} / {max}</p>\n",
            "      <p class=\"milestone\">{milestone}</p>\n",
            "{warning}",
            "      <button class=\"xp\" data-slug=\"{slug}\">+{step} XP</button>\n",
            "    </div>\n",
        ),
        name = escape_html(stat.category.name()),
        progress = stat.progress,
        level = stat.level,
        max = crate::leveling::MAX_LEVEL,
        milestone = escape_html(stat.milestone),
        warning = warning,
        slug = stat.slug,
        step = xp_step,
    )
}

/// Full page. Buttons POST to `/api/xp/<slug>` and `/api/reset`, then reload.
pub fn render_html(report: &Report, xp_step: u64) -> String {
    let cards: String = report.stats.iter().map(|s| render_card(s, xp_step)).collect();
    let chart = script_json(&radar_payload(report));
    format!(
        r#"<!DOCTYPE html>
<html lang="nl">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{chart_src}"></script>
  <style>
    body {{ background: #000; color: #fff; font-family: sans-serif; padding: 2rem 1.5rem; }}
    h1 {{ color: #22d3ee; text-align: center; margin-bottom: 0.5rem; }}
    .ace {{ color: #a5f3fc; text-align: center; font-size: 1.125rem; }}
    .chart {{ max-width: 36rem; margin: 0 auto; }}
    .actions {{ text-align: center; margin-top: 1.5rem; }}
    .reset {{ background: #dc2626; color: #fff; border: 0; border-radius: 0.25rem; padding: 0.5rem 1rem; }}
    .grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(16rem, 1fr)); gap: 1rem; margin-top: 2rem; }}
    .card {{ background: #18181b; border: 1px solid #0e7490; border-radius: 0.75rem; padding: 1rem; }}
    .card h3 {{ color: #67e8f9; margin: 0; }}
    .bar {{ height: 0.5rem; background: #3f3f46; border-radius: 0.25rem; margin-top: 0.5rem; }}
    .fill {{ height: 100%; background: #22d3ee; border-radius: 0.25rem; }}
    .level {{ font-size: 0.875rem; margin: 0.25rem 0 0; }}
    .milestone {{ font-size: 0.75rem; color: #22d3ee; margin: 0.25rem 0 0; }}
    .warn {{ font-size: 0.75rem; color: #ef4444; margin: 0.25rem 0 0; }}
    .xp {{ margin-top: 0.5rem; background: #0891b2; color: #fff; border: 0; border-radius: 0.25rem; padding: 0.25rem 0.75rem; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p class="ace">ACE LEVEL {average}</p>
  <div class="chart"><canvas id="radar"></canvas></div>
  <div class="actions"><button class="reset" id="reset">🔄 Reset Tracker</button></div>
  <div class="grid">
{cards}  </div>
  <script>
    const chart = {chart};
    new Chart(document.getElementById("radar"), chart);
    const post = (path) => fetch(path, {{ method: "POST" }}).then(() => location.reload());
    document.getElementById("reset").addEventListener("click", () => post("/api/reset"));
    document.querySelectorAll("button.xp").forEach((b) =>
      b.addEventListener("click", () => post("/api/xp/" + b.dataset.slug)));
  </script>
</body>
</html>
"#,
        title = TITLE,
        chart_src = CHART_JS_SRC,
        average = report.average_level,
        cards = cards,
        chart = chart,
    )
}

const BAR_WIDTH: u64 = 20;

/// Plain-text rendering for the CLI.
pub fn render_text(report: &Report) -> String {
    let mut out = format!("{}\nACE LEVEL {}\n\n", TITLE, report.average_level);
    for s in &report.stats {
        let filled = (s.progress * BAR_WIDTH / 100) as usize;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH as usize - filled));
        out.push_str(&format!(
            "{:<14} [{}] {:>3}%  Level {:>2} / {}  ({} XP)\n",
            s.category.name(),
            bar,
            s.progress,
            s.level,
            report.max_level,
            s.xp
        ));
        out.push_str(&format!("{:<14} {}\n", "", s.milestone));
        if !s.validated {
            out.push_str(&format!(
                "{:<14} {} (window {}d)\n",
                "", UNVALIDATED_WARNING, s.window_days
            ));
        }
    }
    let stale: Vec<&str> = report.unvalidated().map(|s| s.category.name()).collect();
    if !stale.is_empty() {
        out.push_str(&format!("\nHerhaal binnenkort: {}\n", stale.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Category;
    use crate::state::ProgressState;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 7, 0, 0).unwrap()
    }

    fn sample() -> Report {
        let mut s = ProgressState::fresh(t0());
        s.get_mut(Category::Vo2Max).xp = 3_040;
        s.get_mut(Category::Focus).last_check = t0() - Duration::days(10);
        Report::build(&s, t0())
    }

    #[test]
    fn test_radar_payload_shape() {
        let p = radar_payload(&sample());
        assert_eq!(p["type"], "radar");
        assert_eq!(p["data"]["labels"][2], "VO2 Max");
        assert_eq!(p["data"]["datasets"][0]["data"], json!([1, 1, 31, 1, 1, 1]));
        assert_eq!(p["data"]["datasets"][0]["borderColor"], "#22d3ee");
        assert_eq!(p["options"]["scales"]["r"]["max"], 100);
        assert_eq!(p["options"]["scales"]["r"]["ticks"]["stepSize"], 20);
        assert_eq!(p["options"]["plugins"]["legend"]["display"], false);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("5k in <35m & \"fast\""), "5k in &lt;35m &amp; &quot;fast&quot;");
    }

    #[test]
    fn test_html_contains_cards_and_escapes_milestones() {
        let html = render_html(&sample(), 10);
        assert!(html.contains("ACE LEVEL 6"));
        assert!(html.contains("Level 31 / 99"));
        // VO2 Max third tier: "5k in <35m"
        assert!(html.contains("5k in &lt;35m"));
        assert!(!html.contains("5k in <35m"));
        assert_eq!(html.matches("class=\"card\"").count(), 6);
        assert_eq!(html.matches(UNVALIDATED_WARNING).count(), 1);
        assert!(html.contains("data-slug=\"vo2-max\""));
        assert!(html.contains("+10 XP"));
        assert!(html.contains("width: 40%"));
    }

    #[test]
    fn test_text_rendering() {
        let text = render_text(&sample());
        assert!(text.starts_with(TITLE));
        assert!(text.contains("ACE LEVEL 6"));
        assert!(text.contains("[########------------]  40%  Level 31 / 99  (3040 XP)"));
        assert_eq!(text.matches(UNVALIDATED_WARNING).count(), 1);
        assert!(text.contains("(window 3d)"));
        assert!(text.ends_with("\nHerhaal binnenkort: Focus\n"));
        let fresh = render_text(&Report::build(&ProgressState::fresh(t0()), t0()));
        assert!(!fresh.contains("Herhaal binnenkort"));
    }
}

//! Plain-text resume export.

use std::fmt::Write;

use super::{DateRange, ResumeContent};

const RULE: &str = "===============================";

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}\n{:^31}\n{}", RULE, title, RULE);
}

/// "Name, Place" with either half optional.
fn place_line(out: &mut String, name: &str, location: &str) {
    if name.is_empty() && location.is_empty() {
        return;
    }
    if location.is_empty() {
        let _ = writeln!(out, "{}", name);
    } else {
        let _ = writeln!(out, "{}, {}", name, location);
    }
}

fn date_line(out: &mut String, date: &DateRange) {
    let to = date.to.as_deref().filter(|t| !t.is_empty());
    match to {
        Some(to) => {
            let _ = writeln!(out, "{} – {}", date.from, to);
        }
        None if !date.from.is_empty() => {
            let _ = writeln!(out, "{}", date.from);
        }
        None => {}
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "{}: {}", label, value);
    }
}

fn opt_field(out: &mut String, label: &str, value: Option<&String>) {
    if let Some(v) = value {
        field(out, label, v);
    }
}

fn line(out: &mut String, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "{}", value);
    }
}

/// Render the TXT export: one bannered block per non-empty section.
pub fn format_resume_txt(content: &ResumeContent) -> String {
    let mut out = String::new();

    let p = &content.personal;
    let has_personal = [&p.full_name, &p.location, &p.email]
        .iter()
        .any(|s| !s.is_empty())
        || [&p.phone, &p.website, &p.linkedin, &p.github]
            .iter()
            .any(|s| s.as_deref().is_some_and(|v| !v.is_empty()));
    if has_personal {
        banner(&mut out, "PERSONAL");
        field(&mut out, "Name", &p.full_name);
        field(&mut out, "Location", &p.location);
        field(&mut out, "Email", &p.email);
        opt_field(&mut out, "Phone", p.phone.as_ref());
        opt_field(&mut out, "Website", p.website.as_ref());
        opt_field(&mut out, "LinkedIn", p.linkedin.as_ref());
        opt_field(&mut out, "GitHub", p.github.as_ref());
        out.push('\n');
    }

    if !content.education.is_empty() {
        banner(&mut out, "EDUCATION");
        for edu in &content.education {
            line(&mut out, &edu.degree);
            place_line(&mut out, &edu.school, &edu.location);
            date_line(&mut out, &edu.date);
            field(&mut out, "GPA", &edu.gpa);
            if let Some(courses) = edu.courses.as_ref().filter(|c| !c.is_empty()) {
                field(&mut out, "Courses", &courses.join(", "));
            }
            out.push('\n');
        }
    }

    if !content.experience.is_empty() {
        banner(&mut out, "EXPERIENCE");
        for exp in &content.experience {
            line(&mut out, &exp.job_title);
            place_line(&mut out, &exp.company, &exp.location);
            date_line(&mut out, &exp.date);
            line(&mut out, &exp.description);
            if let Some(notes) = exp.notes.as_ref().filter(|n| !n.is_empty()) {
                out.push_str("Notes:\n");
                for note in notes {
                    let _ = writeln!(out, "- {}", note);
                }
            }
            out.push('\n');
        }
    }

    if !content.projects.is_empty() {
        banner(&mut out, "PROJECTS");
        for proj in &content.projects {
            line(&mut out, &proj.name);
            line(&mut out, &proj.date.from);
            line(&mut out, &proj.description);
            if !proj.technologies.is_empty() {
                field(&mut out, "Technologies", &proj.technologies.join(", "));
            }
            opt_field(&mut out, "Link", proj.link.as_ref());
            out.push('\n');
        }
    }

    if !content.skills.is_empty() {
        banner(&mut out, "SKILLS");
        for skill in &content.skills {
            if !skill.category.is_empty() && !skill.items.is_empty() {
                field(&mut out, &skill.category, &skill.items.join(", "));
            }
        }
        out.push('\n');
    }

    if !content.awards.is_empty() {
        banner(&mut out, "AWARDS");
        for award in &content.awards {
            line(&mut out, &award.title);
            place_line(&mut out, &award.organizer, &award.location);
            line(&mut out, &award.date.from);
            line(&mut out, &award.description);
            out.push('\n');
        }
    }

    out
}

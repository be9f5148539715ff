//! Plain-text export of a record. Reads the record only; never mutates it.

use crate::models::resume::ResumeRecord;
use crate::resume::template::TemplateId;

/// Renders the record as a markdown document with the standard resume sections.
/// Empty sections are still emitted so the layout is stable across records.
pub fn render_text(record: &ResumeRecord, template: TemplateId) -> String {
    let info = &record.personal_info;
    let name = if info.name.trim().is_empty() {
        "YOUR NAME"
    } else {
        info.name.as_str()
    };

    let mut md = format!("# {name}\n\n");
    md.push_str(&format!("<!-- template: {template} -->\n"));
    let contact: Vec<&str> = [&info.email, &info.phone, &info.address]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !contact.is_empty() {
        md.push_str(&contact.join(" | "));
        md.push('\n');
    }

    md.push_str("\n## PROFESSIONAL SUMMARY\n\n");
    if !record.objective.trim().is_empty() {
        md.push_str(record.objective.trim());
        md.push('\n');
    }

    md.push_str("\n## WORK EXPERIENCE\n\n");
    for exp in &record.experience {
        md.push_str(&format!("### {}", exp.title));
        if !exp.company.is_empty() {
            md.push_str(&format!(" - {}", exp.company));
        }
        md.push('\n');
        push_meta_line(&mut md, &exp.dates, &exp.location);
        for bullet in exp.description.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let bullet = bullet.trim_start_matches(['-', '*', '•']).trim_start();
            md.push_str(&format!("- {bullet}\n"));
        }
        md.push('\n');
    }

    md.push_str("## EDUCATION\n\n");
    for edu in &record.education {
        md.push_str(&format!("### {}", edu.degree));
        if !edu.school.is_empty() {
            md.push_str(&format!(" - {}", edu.school));
        }
        md.push('\n');
        push_meta_line(&mut md, &edu.dates, &edu.location);
        md.push('\n');
    }

    md.push_str("## SKILLS & QUALIFICATIONS\n\n");
    for skill in &record.skills {
        md.push_str(&format!("- {skill}\n"));
    }

    md.push_str("\n## REFERENCES\n\n");
    for reference in &record.references {
        md.push_str(&format!("**{}**\n", reference.name));
        push_meta_line(&mut md, &reference.relation, &reference.contact);
        md.push('\n');
    }

    md
}

fn push_meta_line(md: &mut String, left: &str, right: &str) {
    let parts: Vec<&str> = [left, right]
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if !parts.is_empty() {
        md.push_str(&format!("_{}_\n", parts.join(" | ")));
    }
}

/// `Jane_Doe_Resume.<ext>`, or `resume_Resume.<ext>` when the name is blank.
pub fn export_file_name(record: &ResumeRecord, extension: &str) -> String {
    let name = record.personal_info.name.trim();
    let stem = if name.is_empty() {
        "resume".to_string()
    } else {
        name.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!("{stem}_Resume.{extension}")
}

//! Reference data seeding
//!
//! Saudi administrative regions, organization types, organization subtypes
//! and service tags, each with an Arabic display name.

use anyhow::Result;
use sea_orm::ConnectionTrait;

use crate::error::RepositoryError;
use crate::repositories::{ReferenceInput, ReferenceKind, ReferenceRepository};

const REGIONS: &[(&str, &str)] = &[
    ("Riyadh", "الرياض"),
    ("Makkah", "مكة المكرمة"),
    ("Madinah", "المدينة المنورة"),
    ("Eastern Province", "المنطقة الشرقية"),
    ("Asir", "عسير"),
    ("Tabuk", "تبوك"),
    ("Qassim", "القصيم"),
    ("Ha'il", "حائل"),
    ("Northern Borders", "الحدود الشمالية"),
    ("Jazan", "جازان"),
    ("Najran", "نجران"),
    ("Al-Bahah", "الباحة"),
    ("Al-Jouf", "الجوف"),
];

const ORGANIZATION_TYPES: &[(&str, &str)] = &[
    ("Government Entity", "جهة حكومية"),
    ("Non-Profit Organization", "منظمة غير ربحية"),
    ("Private Sector", "القطاع الخاص"),
    ("Social Enterprise", "مؤسسة اجتماعية"),
    ("Foundation", "مؤسسة خيرية"),
    ("Investment Fund", "صندوق استثماري"),
    ("Development Agency", "وكالة تنمية"),
    ("Research Institute", "معهد بحثي"),
    ("Educational Institution", "مؤسسة تعليمية"),
    ("Healthcare Provider", "مقدم رعاية صحية"),
];

const ORGANIZATION_SUBTYPES: &[(&str, &str)] = &[
    ("Venture Capital", "رأس المال المغامر"),
    ("Impact Investor", "مستثمر التأثير"),
    ("Accelerator", "مسرّع أعمال"),
    ("Incubator", "حاضنة أعمال"),
    ("Corporate Social Responsibility", "المسؤولية الاجتماعية للشركات"),
    ("Grant Maker", "مانح"),
    ("Technical Assistance Provider", "مقدم مساعدة فنية"),
    ("Research & Development", "البحث والتطوير"),
    ("Training & Capacity Building", "التدريب وبناء القدرات"),
    ("Policy & Advocacy", "السياسات والدعوة"),
];

const SERVICES: &[(&str, &str)] = &[
    ("Funding & Investment", "التمويل والاستثمار"),
    ("Mentorship & Advisory", "الإرشاد والاستشارات"),
    ("Technical Training", "التدريب التقني"),
    ("Business Development", "تطوير الأعمال"),
    ("Research & Analytics", "البحث والتحليل"),
    ("Network & Partnerships", "الشبكات والشراكات"),
    ("Impact Measurement", "قياس التأثير"),
    ("Legal & Compliance", "القانونية والامتثال"),
    ("Marketing & Communications", "التسويق والاتصالات"),
    ("Technology & Digital Solutions", "التكنولوجيا والحلول الرقمية"),
    ("Project Management", "إدارة المشاريع"),
    ("Monitoring & Evaluation", "المتابعة والتقييم"),
    ("Grants Management", "إدارة المنح"),
    ("ESG Consulting", "استشارات الحوكمة البيئية والاجتماعية"),
    ("Community Engagement", "المشاركة المجتمعية"),
];

/// Rows inserted and skipped by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Seeds every reference table, skipping names that already exist.
pub async fn seed_reference_data<C>(db: &C) -> Result<SeedReport>
where
    C: ConnectionTrait,
{
    let repo = ReferenceRepository::new();
    let mut report = SeedReport::default();

    for (kind, rows) in [
        (ReferenceKind::Region, REGIONS),
        (ReferenceKind::OrganizationType, ORGANIZATION_TYPES),
        (ReferenceKind::OrganizationSubtype, ORGANIZATION_SUBTYPES),
        (ReferenceKind::Service, SERVICES),
    ] {
        let mut created = 0;
        for (name, name_ar) in rows {
            let input = ReferenceInput {
                name: name.to_string(),
                name_ar: Some(name_ar.to_string()),
                ..Default::default()
            };

            match repo.create(db, kind, input).await {
                Ok(_) => created += 1,
                Err(RepositoryError::Conflict(_)) => {
                    log::debug!("{} '{}' already exists, skipping", kind.label(), name);
                    report.skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        log::info!("Seeded {} new {} entries", created, kind);
        report.created += created;
    }

    Ok(report)
}

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::models::verification::DocumentType;
use crate::utils::time::{french_long_datetime, short_date};
use chrono::{NaiveDateTime, Utc};
use genpdf::elements::{Break, FrameCellDecorator, Image, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Document, Element};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const COMPANY_NAME: &str = "SALSABIL";
const COMPANY_TAGLINE: &str = "Entreprise de Recrutement";
const COMPANY_LOCATION: &str = "Djibouti";

const INK: Color = Color::Rgb(44, 62, 80);
const ACCENT: Color = Color::Rgb(52, 152, 219);
const SUCCESS: Color = Color::Rgb(46, 204, 113);
const MUTED: Color = Color::Rgb(127, 140, 141);

// One QR module is drawn as a 8px square, plus a 4-module quiet zone; at
// 150 dpi the finished image lands around 4 cm on the page.
const QR_MODULE_PX: u32 = 8;
const QR_QUIET_MODULES: u32 = 4;
const QR_DPI: f64 = 150.0;

/// Identity fields a document must carry. Construction validates that the
/// operationally required fields are present; the renderer never substitutes
/// blank strings.
#[derive(Debug, Clone)]
pub struct CandidateDetails {
    pub application_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub job_title: String,
}

impl CandidateDetails {
    pub fn from_application(app: &Application) -> Result<Self> {
        let required = |value: &str, field: &str| -> Result<String> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(Error::MissingField(field.to_string()))
            } else {
                Ok(trimmed.to_string())
            }
        };

        Ok(Self {
            application_id: app.id,
            first_name: required(&app.first_name, "first_name")?,
            last_name: required(&app.last_name, "last_name")?,
            email: required(&app.email, "email")?,
            phone: required(&app.phone, "phone")?,
            address: required(app.address.as_deref().unwrap_or(""), "address")?,
            job_title: required(&app.job_title, "job_title")?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Renders convocations and acceptance letters to PDF bytes. Rendering is
/// synchronous; callers run it off the async runtime (see WorkflowService).
#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    logo_path: PathBuf,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>, logo_path: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            logo_path: logo_path.into(),
        }
    }

    pub fn verification_url(base_url: &str, code: &str) -> String {
        format!("{}/verify/{}", base_url.trim_end_matches('/'), code)
    }

    pub fn reference_string(document_type: DocumentType, application_id: i64) -> String {
        format!(
            "Référence : {}-{}-{}",
            document_type.reference_prefix(),
            application_id,
            Utc::now().format("%Y%m%d")
        )
    }

    pub fn render_interview_invitation(
        &self,
        details: &CandidateDetails,
        interview_date: &str,
        verification_code: Option<&str>,
        base_url: &str,
    ) -> Result<Vec<u8>> {
        let mut doc = self.new_document("Convocation à un entretien")?;

        doc.push(
            Paragraph::new(format!("Émis le {}", short_date(&Utc::now())))
                .aligned(Alignment::Right)
                .styled(Style::new().with_color(MUTED)),
        );
        doc.push(Break::new(1));

        self.push_header(&mut doc);

        doc.push(
            Paragraph::new("CONVOCATION À UN ENTRETIEN")
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(16).with_color(INK)),
        );
        doc.push(Break::new(1));

        self.push_recipient_block(&mut doc, details);

        doc.push(Paragraph::new(format!(
            "Madame, Monsieur {},",
            details.last_name
        )));
        doc.push(Break::new(1));

        let mut intro = Paragraph::default();
        intro.push("Suite à votre candidature pour le poste de ");
        intro.push(StyledString::new(
            details.job_title.clone(),
            Style::new().bold(),
        ));
        intro.push(", nous avons le plaisir de vous informer que votre profil a retenu notre attention.");
        doc.push(intro);
        doc.push(Break::new(1));

        doc.push(Paragraph::new(
            "Nous souhaitons vous rencontrer afin d'échanger sur votre parcours, vos compétences \
             et vos motivations. Nous vous prions de bien vouloir vous présenter à notre siège \
             aux date et heure suivantes :",
        ));
        doc.push(Break::new(1));

        // Localized long form when parseable, the raw string otherwise. A
        // malformed interview date must never abort generation.
        let (long_form, day, time) =
            match NaiveDateTime::parse_from_str(interview_date, "%Y-%m-%dT%H:%M") {
                Ok(dt) => (
                    french_long_datetime(&dt),
                    dt.format("%d/%m/%Y").to_string(),
                    dt.format("%H:%M").to_string(),
                ),
                Err(_) => (
                    interview_date.to_string(),
                    interview_date.to_string(),
                    "À confirmer".to_string(),
                ),
            };

        doc.push(
            Paragraph::new(long_form)
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_color(ACCENT)),
        );
        doc.push(Break::new(1));

        self.push_info_table(
            &mut doc,
            &[
                ("Date", day.as_str()),
                ("Heure", time.as_str()),
                ("Lieu", &format!("Siège de {}", COMPANY_NAME)),
                ("Poste", details.job_title.as_str()),
            ],
        )?;
        doc.push(Break::new(1));

        doc.push(Paragraph::new("IMPORTANT :").styled(Style::new().bold().with_color(INK)));
        for instruction in [
            "Merci de vous présenter 10 minutes avant l'heure prévue.",
            "Ce document est obligatoire pour accéder à nos locaux. Veuillez le présenter à l'accueil.",
            "Veuillez vous munir d'une pièce d'identité en cours de validité.",
            "En cas d'empêchement, merci de nous prévenir au moins 24 heures à l'avance.",
        ] {
            let mut p = Paragraph::default();
            p.push("• ");
            p.push(instruction);
            doc.push(p);
        }
        doc.push(Break::new(1));

        let qr_tmp = self.push_verification(&mut doc, verification_code, base_url)?;

        doc.push(
            Paragraph::new(Self::reference_string(
                DocumentType::InterviewInvitation,
                details.application_id,
            ))
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(8).with_color(MUTED)),
        );

        let bytes = Self::render_to_bytes(doc)?;
        drop(qr_tmp);
        Ok(bytes)
    }

    pub fn render_acceptance_letter(
        &self,
        details: &CandidateDetails,
        verification_code: Option<&str>,
        base_url: &str,
    ) -> Result<Vec<u8>> {
        let mut doc = self.new_document("Lettre d'acceptation")?;

        self.push_header(&mut doc);

        doc.push(
            Paragraph::new("LETTRE D'ACCEPTATION")
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(18).with_color(SUCCESS)),
        );
        doc.push(
            Paragraph::new(format!("Bienvenue dans l'équipe {} !", COMPANY_NAME))
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_color(SUCCESS)),
        );
        doc.push(Break::new(2));

        doc.push(
            Paragraph::new(format!(
                "{}, le {}",
                COMPANY_LOCATION,
                short_date(&Utc::now())
            ))
            .aligned(Alignment::Right)
            .styled(Style::new().with_color(MUTED)),
        );
        doc.push(Break::new(1));

        self.push_recipient_block(&mut doc, details);

        doc.push(
            Paragraph::new(format!(
                "Objet : Acceptation de votre candidature - {}",
                details.job_title
            ))
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_color(INK)),
        );
        doc.push(Break::new(1));

        doc.push(Paragraph::new(format!(
            "Madame, Monsieur {},",
            details.last_name
        )));
        doc.push(Break::new(1));

        let mut para = Paragraph::default();
        para.push(
            "C'est avec un immense plaisir que nous vous informons que votre candidature pour le poste de ",
        );
        para.push(StyledString::new(
            details.job_title.clone(),
            Style::new().bold(),
        ));
        para.push(format!(" au sein de {} a été ", COMPANY_NAME));
        para.push(StyledString::new(
            "retenue",
            Style::new().bold().with_color(SUCCESS),
        ));
        para.push(".");
        doc.push(para);
        doc.push(Break::new(1));

        doc.push(Paragraph::new(
            "Après avoir examiné attentivement votre dossier et suite à l'entretien que vous avez \
             passé, nous avons été convaincus par vos compétences, votre motivation et votre \
             professionnalisme. Vous avez démontré toutes les qualités requises pour réussir dans \
             ce poste.",
        ));
        doc.push(Break::new(1));

        doc.push(Paragraph::new(
            "Nous vous invitons à prendre contact avec notre service des ressources humaines dans \
             les 7 jours ouvrables suivant la réception de cette lettre afin de finaliser les \
             formalités administratives et convenir de votre date de prise de fonction.",
        ));
        doc.push(Break::new(1));

        self.push_info_table(
            &mut doc,
            &[
                ("Téléphone", "+253 XXX XXX XXX"),
                ("Email", "rh@salsabil.dj"),
                ("Adresse", &format!("{}, {}", COMPANY_NAME, COMPANY_LOCATION)),
            ],
        )?;
        doc.push(Break::new(1));

        doc.push(Paragraph::new(
            "Nous sommes ravis de vous accueillir au sein de notre équipe et nous sommes \
             convaincus que votre arrivée contribuera grandement au développement et au succès \
             de notre entreprise.",
        ));
        doc.push(Break::new(1));

        doc.push(Paragraph::new(
            "Dans l'attente de vous rencontrer très prochainement, nous vous prions d'agréer, \
             Madame, Monsieur, l'expression de nos salutations distinguées.",
        ));
        doc.push(Break::new(2));

        doc.push(
            Paragraph::new("Le Directeur des Ressources Humaines")
                .aligned(Alignment::Right)
                .styled(Style::new().bold()),
        );
        doc.push(
            Paragraph::new(COMPANY_NAME)
                .aligned(Alignment::Right)
                .styled(Style::new().bold()),
        );
        doc.push(Break::new(1));

        let qr_tmp = self.push_verification(&mut doc, verification_code, base_url)?;

        doc.push(
            Paragraph::new(Self::reference_string(
                DocumentType::AcceptanceLetter,
                details.application_id,
            ))
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(8).with_color(MUTED)),
        );

        let bytes = Self::render_to_bytes(doc)?;
        drop(qr_tmp);
        Ok(bytes)
    }

    fn new_document(&self, title: &str) -> Result<Document> {
        let fonts = self.load_fonts()?;
        let mut doc = Document::new(fonts);
        doc.set_title(title);
        doc.set_paper_size(genpdf::PaperSize::A4);
        doc.set_font_size(10);
        doc.set_line_spacing(1.2);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(20);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    fn load_fonts(&self) -> Result<FontFamily<FontData>> {
        if let Ok(family) = genpdf::fonts::from_files(&self.fonts_dir, "DejaVuSans", None) {
            return Ok(family);
        }
        Self::system_fonts().ok_or_else(|| {
            Error::Render(format!(
                "No usable font family in {} or the system font directory",
                self.fonts_dir.display()
            ))
        })
    }

    fn system_fonts() -> Option<FontFamily<FontData>> {
        let dir = Path::new("/usr/share/fonts/truetype/dejavu");
        let load = |file: &str| -> Option<FontData> {
            let bytes = std::fs::read(dir.join(file)).ok()?;
            FontData::new(bytes, None).ok()
        };
        Some(FontFamily {
            regular: load("DejaVuSans.ttf")?,
            bold: load("DejaVuSans-Bold.ttf")?,
            italic: load("DejaVuSans-Oblique.ttf")?,
            bold_italic: load("DejaVuSans-BoldOblique.ttf")?,
        })
    }

    /// Issuer branding: the logo asset when it exists and decodes, a text
    /// header otherwise.
    fn push_header(&self, doc: &mut Document) {
        if self.logo_path.exists() {
            if let Ok(mut logo) = Image::from_path(&self.logo_path) {
                logo.set_alignment(Alignment::Center);
                logo.set_dpi(QR_DPI);
                doc.push(logo);
                doc.push(Break::new(1));
                return;
            }
        }
        doc.push(
            Paragraph::new(COMPANY_NAME)
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(18).with_color(INK)),
        );
        doc.push(
            Paragraph::new(COMPANY_TAGLINE)
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_color(ACCENT)),
        );
        doc.push(Break::new(1));
    }

    fn push_recipient_block(&self, doc: &mut Document, details: &CandidateDetails) {
        doc.push(Paragraph::new("À l'attention de :").styled(Style::new().bold()));
        doc.push(Paragraph::new(details.full_name()).styled(Style::new().bold()));
        doc.push(Paragraph::new(details.email.clone()));
        doc.push(Paragraph::new(details.phone.clone()));
        doc.push(Paragraph::new(details.address.clone()));
        doc.push(Break::new(1));
    }

    fn push_info_table(&self, doc: &mut Document, rows: &[(&str, &str)]) -> Result<()> {
        let mut table = TableLayout::new(vec![1, 2]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        for (label, value) in rows {
            table
                .row()
                .element(
                    Paragraph::new(label.to_string())
                        .styled(Style::new().bold().with_color(INK))
                        .padded(1),
                )
                .element(
                    Paragraph::new(value.to_string())
                        .styled(Style::new().with_color(INK))
                        .padded(1),
                )
                .push()
                .map_err(|e| Error::Render(e.to_string()))?;
        }
        doc.push(table);
        Ok(())
    }

    /// Embeds the scannable QR image and the human-readable code line. The
    /// returned temp file must stay alive until the document is rendered.
    fn push_verification(
        &self,
        doc: &mut Document,
        verification_code: Option<&str>,
        base_url: &str,
    ) -> Result<Option<NamedTempFile>> {
        let Some(code) = verification_code else {
            return Ok(None);
        };

        let url = Self::verification_url(base_url, code);
        let tmp = Self::qr_png(&url)?;
        let mut qr = Image::from_path(tmp.path())
            .map_err(|e| Error::Render(format!("QR image embedding failed: {}", e)))?;
        qr.set_dpi(QR_DPI);
        qr.set_alignment(Alignment::Center);
        doc.push(qr);
        doc.push(
            Paragraph::new(format!("Code de vérification : {}", code))
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(11).with_color(INK)),
        );
        doc.push(Break::new(1));
        Ok(Some(tmp))
    }

    /// QR matrix rendered to an RGB PNG in a temp file (high error
    /// correction, so the code survives print-and-scan).
    fn qr_png(url: &str) -> Result<NamedTempFile> {
        let code = QrCode::with_error_correction_level(url, EcLevel::H)
            .map_err(|e| Error::Render(format!("QR encoding failed: {}", e)))?;
        let width = code.width() as u32;
        let colors = code.to_colors();

        let size = (width + 2 * QR_QUIET_MODULES) * QR_MODULE_PX;
        let mut raw = vec![255u8; (size * size * 3) as usize];
        for (idx, color) in colors.iter().enumerate() {
            if *color == qrcode::Color::Dark {
                let mx = (idx as u32 % width + QR_QUIET_MODULES) * QR_MODULE_PX;
                let my = (idx as u32 / width + QR_QUIET_MODULES) * QR_MODULE_PX;
                for y in my..my + QR_MODULE_PX {
                    for x in mx..mx + QR_MODULE_PX {
                        let offset = ((y * size + x) * 3) as usize;
                        raw[offset..offset + 3].copy_from_slice(&[0, 0, 0]);
                    }
                }
            }
        }

        let mut tmp = NamedTempFile::new()?;
        {
            let file = tmp.as_file_mut();
            let mut encoder = png::Encoder::new(file, size, size);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| Error::Render(e.to_string()))?;
            writer
                .write_image_data(&raw)
                .map_err(|e| Error::Render(e.to_string()))?;
        }
        Ok(tmp)
    }

    fn render_to_bytes(doc: Document) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        doc.render(&mut out)
            .map_err(|e| Error::Render(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{Phase1Status, WorkflowPhase};

    fn sample_application() -> Application {
        Application {
            id: 3,
            job_id: 1,
            job_title: "Comptable".into(),
            first_name: "Awa".into(),
            last_name: "Hassan".into(),
            email: "awa.hassan@example.dj".into(),
            phone: "+253 77 00 00 00".into(),
            address: Some("Quartier 4, Djibouti".into()),
            country: Some("Djibouti".into()),
            photo: None,
            cv: None,
            cover_letter: None,
            id_card: None,
            recommendation_letter: None,
            criminal_record: None,
            diploma: None,
            status: "interview scheduled".into(),
            submitted_at: Utc::now(),
            workflow_phase: WorkflowPhase::Phase1,
            phase1_status: Phase1Status::SelectedForInterview,
            phase1_date: Some(Utc::now()),
            interview_date: Some("2025-10-15T14:00".into()),
            interview_notes: None,
            phase2_status: None,
            phase2_date: None,
            rejection_reason: None,
            phase1_notification_sent: false,
            phase2_notification_sent: false,
            interview_invitation_pdf: None,
            acceptance_letter_pdf: None,
        }
    }

    fn service() -> DocumentService {
        DocumentService::new("assets/fonts", "assets/img/logo.jpeg")
    }

    #[test]
    fn verification_url_is_well_formed() {
        assert_eq!(
            DocumentService::verification_url("http://localhost:5000/", "ABCDEF0123456789"),
            "http://localhost:5000/verify/ABCDEF0123456789"
        );
    }

    #[test]
    fn missing_identity_field_is_rejected() {
        let mut app = sample_application();
        app.email = "  ".into();
        let err = CandidateDetails::from_application(&app).unwrap_err();
        assert!(matches!(err, Error::MissingField(field) if field == "email"));

        let mut app = sample_application();
        app.address = None;
        let err = CandidateDetails::from_application(&app).unwrap_err();
        assert!(matches!(err, Error::MissingField(field) if field == "address"));
    }

    #[test]
    fn invitation_renders_with_and_without_code() {
        let svc = service();
        let details = CandidateDetails::from_application(&sample_application()).unwrap();

        let with_code = svc
            .render_interview_invitation(
                &details,
                "2025-10-15T14:00",
                Some("ABCDEF0123456789"),
                "http://localhost:5000",
            )
            .expect("render with code");
        let without_code = svc
            .render_interview_invitation(&details, "2025-10-15T14:00", None, "http://localhost:5000")
            .expect("render without code");

        assert!(with_code.starts_with(b"%PDF"));
        assert!(without_code.starts_with(b"%PDF"));
        // the QR image XObject makes the verified document strictly larger
        assert!(with_code.len() > without_code.len());
    }

    #[test]
    fn unparseable_interview_date_does_not_abort() {
        let svc = service();
        let details = CandidateDetails::from_application(&sample_application()).unwrap();
        let bytes = svc
            .render_interview_invitation(&details, "mi-octobre", None, "http://localhost:5000")
            .expect("render with raw date");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn acceptance_letter_renders() {
        let svc = service();
        let details = CandidateDetails::from_application(&sample_application()).unwrap();
        let bytes = svc
            .render_acceptance_letter(&details, Some("0123456789ABCDEF"), "http://localhost:5000")
            .expect("render acceptance letter");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_fonts_directory_fails_with_render_error() {
        let svc = DocumentService::new("/nonexistent/fonts", "/nonexistent/logo.jpeg");
        // only meaningful on hosts without the system DejaVu fallback
        if DocumentService::system_fonts().is_some() {
            return;
        }
        let details = CandidateDetails::from_application(&sample_application()).unwrap();
        let err = svc
            .render_acceptance_letter(&details, None, "http://localhost:5000")
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn qr_png_is_square_and_deterministic() {
        let a = DocumentService::qr_png("http://localhost:5000/verify/ABCDEF0123456789").unwrap();
        let b = DocumentService::qr_png("http://localhost:5000/verify/ABCDEF0123456789").unwrap();
        let bytes_a = std::fs::read(a.path()).unwrap();
        let bytes_b = std::fs::read(b.path()).unwrap();
        assert!(!bytes_a.is_empty());
        assert_eq!(bytes_a, bytes_b);
    }
}

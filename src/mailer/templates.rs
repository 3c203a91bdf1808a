use askama::Template;
use booking::grouping::ReservationGroup;
use chrono::NaiveDate;
use common::Error;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{Address, Message};
use models::Participant;

use crate::mailer::Mailer;

#[derive(Clone, Debug, Template)]
#[template(path = "reservation_approved.html")]
struct ReservationApprovedTemplate<'a> {
	requester_name: &'a str,
	lab_name:       &'a str,
	dates:          Vec<String>,
	slots:          &'a str,
	purpose:        &'a str,
	headcount:      i32,
}

#[derive(Clone, Debug, Template)]
#[template(path = "operations_notice.html")]
struct OperationsNoticeTemplate<'a> {
	requester_name:  &'a str,
	requester_email: &'a str,
	lab_name:        &'a str,
	dates:           Vec<String>,
	slots:           &'a str,
	purpose:         &'a str,
	headcount:       i32,
}

fn format_dates(dates: &[NaiveDate]) -> Vec<String> {
	dates.iter().map(|d| d.format("%-d %B %Y").to_string()).collect()
}

impl Mailer {
	fn approval_mail(
		&self,
		group: &ReservationGroup,
		requester: &Participant,
	) -> Result<Message, Error> {
		let Some(email) = requester.email.as_deref() else {
			return Err(Error::MissingRequestData(format!(
				"requester {} has no email address",
				requester.id
			)));
		};

		let address: Address = email.parse()?;

		let body = ReservationApprovedTemplate {
			requester_name: &requester.name,
			lab_name:       &group.lab.name,
			dates:          format_dates(&group.dates),
			slots:          &group.slot_summary,
			purpose:        &group.purpose,
			headcount:      group.headcount,
		};

		self.try_build_message(
			Mailbox::new(Some(requester.name.clone()), address),
			"Your lab reservation was approved",
			body.render()?,
			ContentType::TEXT_HTML,
		)
	}

	fn operations_notice(
		&self,
		group: &ReservationGroup,
		requester: &Participant,
	) -> Result<Message, Error> {
		let notice = OperationsNoticeTemplate {
			requester_name:  &requester.name,
			requester_email: requester.email.as_deref().unwrap_or("no email"),
			lab_name:        &group.lab.name,
			dates:           format_dates(&group.dates),
			slots:           &group.slot_summary,
			purpose:         &group.purpose,
			headcount:       group.headcount,
		};

		self.try_build_message(
			self.operations(),
			&format!("Approved reservation for {}", group.lab.name),
			notice.render()?,
			ContentType::TEXT_HTML,
		)
	}

	/// Notify the requester and the operations mailbox that a reservation
	/// group was approved
	///
	/// Either mail failing does not stop the other, every failure is logged
	#[instrument(skip(self))]
	pub(crate) async fn send_reservation_approved(
		&self,
		group: &ReservationGroup,
	) {
		let Some(requester) = group.requester() else {
			warn!("approved reservation group {:?} has no requester", group.key);

			return;
		};

		let mails = [
			("approval", self.approval_mail(group, requester)),
			("operations notice", self.operations_notice(group, requester)),
		];

		let mut sent = 0;

		for (kind, mail) in mails {
			let result = match mail {
				Ok(mail) => self.send(mail).await,
				Err(e) => Err(e),
			};

			match result {
				Ok(()) => sent += 1,
				Err(e) => {
					error!(
						"could not send {kind} email for reservation group {:?} \
						 -- {e}",
						group.key
					);
				},
			}
		}

		info!(
			"sent {sent} approval emails for reservation group {:?}",
			group.key
		);
	}

	/// Queue a plain text mail to an arbitrary recipient
	#[instrument(skip(self, body))]
	pub(crate) fn relay(
		&self,
		to: &str,
		subject: &str,
		body: String,
	) -> Result<(), Error> {
		let address: Address = to.parse()?;

		let mail = self.try_build_message(
			Mailbox::new(None, address),
			subject,
			body,
			ContentType::TEXT_PLAIN,
		)?;

		self.try_send(mail)?;

		info!("queued relayed email to {to}");

		Ok(())
	}
}

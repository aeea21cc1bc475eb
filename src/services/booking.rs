use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::ApiError;
use crate::models::{Booking, BookingInput, BookingStatus, Guest, GuestInput};
use crate::services::pricing;

/// Parse a client-supplied date. Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` (midnight).
pub fn parse_date_input(s: &str) -> Result<NaiveDateTime, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN));
    }
    Err(ApiError::Validation(format!("invalid date: {s}")))
}

/// Check-out must be strictly after check-in, and check-in must not be in
/// the past at call time. Neither condition is re-validated later in a
/// booking's life.
pub fn validate_date_range(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<(), ApiError> {
    if check_in >= check_out {
        return Err(ApiError::DateRange(
            "check-out date must be after check-in date".to_string(),
        ));
    }
    if check_in < Utc::now().naive_utc() {
        return Err(ApiError::DateRange(
            "check-in date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// True when no confirmed booking overlaps the requested range. Pending
/// bookings never block, so two guests can hold pending bookings for the
/// same dates; only one can ever be confirmed.
pub fn check_availability(
    conn: &Connection,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<bool, ApiError> {
    validate_date_range(check_in, check_out)?;
    let conflicts = queries::count_confirmed_overlapping(conn, check_in, check_out)?;
    Ok(conflicts == 0)
}

/// Validates, prices, and persists a guest+booking pair. The guest is
/// upserted by email; the booking starts out pending and unpaid. All
/// validation happens before the first write.
pub fn create_booking_with_guest(
    conn: &Connection,
    guest_input: &GuestInput,
    booking_input: &BookingInput,
) -> Result<(Guest, Booking), ApiError> {
    guest_input.validate()?;
    if !(1..=20).contains(&booking_input.number_of_guests) {
        return Err(ApiError::Validation(
            "number of guests must be between 1 and 20".to_string(),
        ));
    }

    let check_in = parse_date_input(&booking_input.check_in_date)?;
    let check_out = parse_date_input(&booking_input.check_out_date)?;
    validate_date_range(check_in, check_out)?;

    if queries::count_confirmed_overlapping(conn, check_in, check_out)? > 0 {
        return Err(ApiError::Conflict(
            "selected dates are not available".to_string(),
        ));
    }

    // Pricing always comes from the validated range, never from the client.
    let quote = pricing::compute_pricing(check_in, check_out)?;

    let now = Utc::now().naive_utc();
    let guest = queries::upsert_guest(conn, guest_input, now)?;

    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        guest_id: guest.id.clone(),
        check_in_date: check_in,
        check_out_date: check_out,
        number_of_guests: booking_input.number_of_guests,
        number_of_nights: quote.number_of_nights,
        base_price: quote.base_price,
        taxes: quote.taxes,
        fees: quote.fees,
        total_price: quote.total_price,
        status: BookingStatus::Pending,
        is_paid: false,
        notes: booking_input.notes.clone(),
        amenities: booking_input.amenities.clone(),
        created_at: now,
        updated_at: now,
        confirmed_at: None,
    };
    queries::insert_booking(conn, &booking)?;

    Ok((guest, booking))
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> Result<Booking, ApiError> {
    queries::set_booking_status(conn, id, status, Utc::now().naive_utc())?
        .ok_or(ApiError::NotFound("booking"))
}

pub fn cancel_booking(conn: &Connection, id: &str) -> Result<Booking, ApiError> {
    update_booking_status(conn, id, BookingStatus::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::pricing::compute_pricing;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn guest_input(email: &str) -> GuestInput {
        GuestInput {
            first_name: "Ana".to_string(),
            last_name: "Torres".to_string(),
            email: email.to_string(),
            phone: None,
            country: Some("Spain".to_string()),
            special_requests: None,
        }
    }

    fn booking_input(check_in: &str, check_out: &str) -> BookingInput {
        BookingInput {
            check_in_date: check_in.to_string(),
            check_out_date: check_out.to_string(),
            number_of_guests: 2,
            notes: None,
            amenities: None,
        }
    }

    #[test]
    fn test_parse_date_input_formats() {
        assert_eq!(
            parse_date_input("2030-07-01").unwrap(),
            dt("2030-07-01 00:00")
        );
        assert_eq!(
            parse_date_input("2030-07-01T15:30:00").unwrap(),
            dt("2030-07-01 15:30")
        );
        assert_eq!(
            parse_date_input("2030-07-01T15:30:00Z").unwrap(),
            dt("2030-07-01 15:30")
        );
        assert_eq!(
            parse_date_input("2030-07-01T15:30:00+02:00").unwrap(),
            dt("2030-07-01 13:30")
        );
        assert!(parse_date_input("july 1st").is_err());
        assert!(parse_date_input("").is_err());
    }

    #[test]
    fn test_empty_house_is_available() {
        let conn = setup_db();
        let available =
            check_availability(&conn, dt("2030-07-01 00:00"), dt("2030-07-05 00:00")).unwrap();
        assert!(available);
    }

    #[test]
    fn test_availability_rejects_inverted_range() {
        let conn = setup_db();
        let err = check_availability(&conn, dt("2030-07-05 00:00"), dt("2030-07-01 00:00"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DateRange(_)));
    }

    #[test]
    fn test_availability_rejects_past_check_in() {
        let conn = setup_db();
        let err = check_availability(&conn, dt("2020-07-01 00:00"), dt("2020-07-05 00:00"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DateRange(_)));
    }

    #[test]
    fn test_pending_booking_does_not_block() {
        let conn = setup_db();
        create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();

        let available =
            check_availability(&conn, dt("2030-07-01 00:00"), dt("2030-07-05 00:00")).unwrap();
        assert!(available);
    }

    #[test]
    fn test_confirmed_booking_blocks() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();
        update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();

        let available =
            check_availability(&conn, dt("2030-07-01 00:00"), dt("2030-07-05 00:00")).unwrap();
        assert!(!available);
    }

    #[test]
    fn test_overlap_boundary_is_inclusive() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();
        update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();

        // A stay starting on the existing checkout day still conflicts.
        assert!(!check_availability(&conn, dt("2030-07-05 00:00"), dt("2030-07-08 00:00")).unwrap());
        // A stay ending on the existing check-in day still conflicts.
        assert!(!check_availability(&conn, dt("2030-06-28 00:00"), dt("2030-07-01 00:00")).unwrap());
        // The day after checkout is free.
        assert!(check_availability(&conn, dt("2030-07-06 00:00"), dt("2030-07-09 00:00")).unwrap());
    }

    #[test]
    fn test_create_booking_conflicts_with_confirmed() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();
        update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();

        let err = create_booking_with_guest(
            &conn,
            &guest_input("bea@example.com"),
            &booking_input("2030-07-03", "2030-07-08"),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // Nothing was written for the rejected attempt.
        assert!(queries::get_guest_by_email(&conn, "bea@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_create_booking_prices_server_side() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-06-01", "2030-06-04"),
        )
        .unwrap();

        let quote = compute_pricing(dt("2030-06-01 00:00"), dt("2030-06-04 00:00")).unwrap();
        assert_eq!(booking.number_of_nights, quote.number_of_nights);
        assert_eq!(booking.base_price, quote.base_price);
        assert_eq!(booking.taxes, quote.taxes);
        assert_eq!(booking.fees, quote.fees);
        assert_eq!(booking.total_price, quote.total_price);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.is_paid);
        assert!(booking.confirmed_at.is_none());
    }

    #[test]
    fn test_create_booking_rejects_bad_guest_count() {
        let conn = setup_db();
        for count in [0, 21, -1] {
            let mut input = booking_input("2030-07-01", "2030-07-05");
            input.number_of_guests = count;
            let err =
                create_booking_with_guest(&conn, &guest_input("ana@example.com"), &input)
                    .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "accepted: {count}");
        }
    }

    #[test]
    fn test_guest_upsert_is_idempotent_across_bookings() {
        let conn = setup_db();
        let (first_guest, _) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();

        let mut updated = guest_input("ana@example.com");
        updated.first_name = "Anna".to_string();
        let (second_guest, _) = create_booking_with_guest(
            &conn,
            &updated,
            &booking_input("2030-08-01", "2030-08-05"),
        )
        .unwrap();

        assert_eq!(first_guest.id, second_guest.id);
        assert_eq!(second_guest.first_name, "Anna");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM guests", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let bookings = queries::get_bookings_by_guest(&conn, &first_guest.id).unwrap();
        assert_eq!(bookings.len(), 2);
    }

    #[test]
    fn test_confirm_stamps_confirmation_time() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();

        let confirmed =
            update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.confirmed_at.is_some());
    }

    #[test]
    fn test_other_transitions_leave_confirmation_time() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();

        let confirmed =
            update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();
        let stamp = confirmed.confirmed_at.unwrap();

        let completed =
            update_booking_status(&conn, &booking.id, BookingStatus::Completed).unwrap();
        assert_eq!(completed.confirmed_at, Some(stamp));

        let cancelled = cancel_booking(&conn, &booking.id).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.confirmed_at, Some(stamp));
    }

    #[test]
    fn test_reconfirm_resets_confirmation_time() {
        let conn = setup_db();
        let (_, booking) = create_booking_with_guest(
            &conn,
            &guest_input("ana@example.com"),
            &booking_input("2030-07-01", "2030-07-05"),
        )
        .unwrap();
        update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();

        // Backdate the stamp, then re-confirm.
        conn.execute(
            "UPDATE bookings SET confirmed_at = '2020-01-01 00:00:00' WHERE id = ?1",
            rusqlite::params![booking.id],
        )
        .unwrap();

        let reconfirmed =
            update_booking_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();
        assert!(reconfirmed.confirmed_at.unwrap() > dt("2020-01-01 00:00"));
    }

    #[test]
    fn test_status_update_unknown_booking() {
        let conn = setup_db();
        let err = update_booking_status(&conn, "missing", BookingStatus::Confirmed).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

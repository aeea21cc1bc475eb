use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Booking, BookingStatus, BookingWithGuest, Guest, GuestInput, Payment, PaymentMethod, Review,
};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_dt(dt: NaiveDateTime) -> String {
    dt.format(DT_FORMAT).to_string()
}

fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DT_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Guests ──

/// Insert-or-update keyed by the unique email index. Contact fields are
/// last-write-wins; the original id and created_at survive a conflict.
pub fn upsert_guest(
    conn: &Connection,
    input: &GuestInput,
    now: NaiveDateTime,
) -> anyhow::Result<Guest> {
    let id = Uuid::new_v4().to_string();
    let ts = fmt_dt(now);

    conn.execute(
        "INSERT INTO guests (id, first_name, last_name, email, phone, country, special_requests, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
         ON CONFLICT(email) DO UPDATE SET
           first_name = excluded.first_name,
           last_name = excluded.last_name,
           phone = excluded.phone,
           country = excluded.country,
           special_requests = excluded.special_requests,
           updated_at = excluded.updated_at",
        params![
            id,
            input.first_name,
            input.last_name,
            input.email,
            input.phone,
            input.country,
            input.special_requests,
            ts,
        ],
    )?;

    get_guest_by_email(conn, &input.email)?
        .ok_or_else(|| anyhow::anyhow!("guest row missing after upsert"))
}

pub fn get_guest_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Guest>> {
    let result = conn.query_row(
        "SELECT id, first_name, last_name, email, phone, country, special_requests, created_at, updated_at
         FROM guests WHERE email = ?1",
        params![email],
        |row| Ok(parse_guest_row(row, 0)),
    );

    match result {
        Ok(guest) => Ok(Some(guest?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn guest_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM guests WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn parse_guest_row(row: &rusqlite::Row, base: usize) -> anyhow::Result<Guest> {
    Ok(Guest {
        id: row.get(base)?,
        first_name: row.get(base + 1)?,
        last_name: row.get(base + 2)?,
        email: row.get(base + 3)?,
        phone: row.get(base + 4)?,
        country: row.get(base + 5)?,
        special_requests: row.get(base + 6)?,
        created_at: parse_dt(&row.get::<_, String>(base + 7)?),
        updated_at: parse_dt(&row.get::<_, String>(base + 8)?),
    })
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let amenities = booking
        .amenities
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO bookings (id, guest_id, check_in_date, check_out_date, number_of_guests, number_of_nights,
                               base_price, taxes, fees, total_price, status, is_paid, notes, amenities,
                               created_at, updated_at, confirmed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            booking.id,
            booking.guest_id,
            fmt_dt(booking.check_in_date),
            fmt_dt(booking.check_out_date),
            booking.number_of_guests,
            booking.number_of_nights,
            booking.base_price,
            booking.taxes,
            booking.fees,
            booking.total_price,
            booking.status.as_str(),
            booking.is_paid as i32,
            booking.notes,
            amenities,
            fmt_dt(booking.created_at),
            fmt_dt(booking.updated_at),
            booking.confirmed_at.map(fmt_dt),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, guest_id, check_in_date, check_out_date, number_of_guests, number_of_nights,
                base_price, taxes, fees, total_price, status, is_paid, notes, amenities,
                created_at, updated_at, confirmed_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn booking_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Confirmed bookings overlapping the requested range, inclusive on both
/// boundaries: a confirmed checkout on the requested check-in day conflicts.
pub fn count_confirmed_overlapping(
    conn: &Connection,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings
         WHERE status = 'confirmed' AND check_in_date <= ?1 AND check_out_date >= ?2",
        params![fmt_dt(check_out), fmt_dt(check_in)],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Updates the status; confirming restamps confirmed_at, so a re-confirm
/// resets the confirmation time. Returns the updated row, None when the id
/// is unknown.
pub fn set_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Booking>> {
    let ts = fmt_dt(now);
    let count = if status == BookingStatus::Confirmed {
        conn.execute(
            "UPDATE bookings SET status = ?1, updated_at = ?2, confirmed_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts, id],
        )?
    } else {
        conn.execute(
            "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts, id],
        )?
    };

    if count == 0 {
        return Ok(None);
    }
    get_booking(conn, id)
}

pub fn mark_booking_paid(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET is_paid = 1, updated_at = ?1 WHERE id = ?2",
        params![fmt_dt(now), id],
    )?;
    Ok(count > 0)
}

const BOOKING_WITH_GUEST_SELECT: &str =
    "SELECT b.id, b.guest_id, b.check_in_date, b.check_out_date, b.number_of_guests, b.number_of_nights,
            b.base_price, b.taxes, b.fees, b.total_price, b.status, b.is_paid, b.notes, b.amenities,
            b.created_at, b.updated_at, b.confirmed_at,
            g.id, g.first_name, g.last_name, g.email, g.phone, g.country, g.special_requests, g.created_at, g.updated_at
     FROM bookings b JOIN guests g ON g.id = b.guest_id";

fn query_bookings_with_guest(
    conn: &Connection,
    suffix: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> anyhow::Result<Vec<BookingWithGuest>> {
    let sql = format!("{BOOKING_WITH_GUEST_SELECT} {suffix}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((parse_booking_row(row), parse_guest_row(row, 17)))
    })?;

    let mut out = vec![];
    for row in rows {
        let (booking, guest) = row?;
        out.push(BookingWithGuest {
            booking: booking?,
            guest: guest?,
            payment: None,
        });
    }
    drop(stmt);

    for item in &mut out {
        item.payment = latest_payment_for_booking(conn, &item.booking.id)?;
    }
    Ok(out)
}

pub fn get_booking_with_guest(
    conn: &Connection,
    id: &str,
) -> anyhow::Result<Option<BookingWithGuest>> {
    let mut items = query_bookings_with_guest(conn, "WHERE b.id = ?1", &[&id])?;
    Ok(items.pop())
}

pub fn get_bookings_by_guest(
    conn: &Connection,
    guest_id: &str,
) -> anyhow::Result<Vec<BookingWithGuest>> {
    query_bookings_with_guest(
        conn,
        "WHERE b.guest_id = ?1 ORDER BY b.created_at DESC",
        &[&guest_id],
    )
}

pub fn get_bookings_in_date_range(
    conn: &Connection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> anyhow::Result<Vec<BookingWithGuest>> {
    let start_str = fmt_dt(start);
    let end_str = fmt_dt(end);
    query_bookings_with_guest(
        conn,
        "WHERE b.check_in_date >= ?1 AND b.check_out_date <= ?2 ORDER BY b.check_in_date DESC",
        &[&start_str, &end_str],
    )
}

pub fn get_all_bookings(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<BookingWithGuest>> {
    query_bookings_with_guest(
        conn,
        "ORDER BY b.created_at DESC LIMIT ?1 OFFSET ?2",
        &[&limit, &offset],
    )
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let status: String = row.get(10)?;
    let amenities: Option<String> = row.get(13)?;
    let confirmed_at: Option<String> = row.get(16)?;

    Ok(Booking {
        id: row.get(0)?,
        guest_id: row.get(1)?,
        check_in_date: parse_dt(&row.get::<_, String>(2)?),
        check_out_date: parse_dt(&row.get::<_, String>(3)?),
        number_of_guests: row.get(4)?,
        number_of_nights: row.get(5)?,
        base_price: row.get(6)?,
        taxes: row.get(7)?,
        fees: row.get(8)?,
        total_price: row.get(9)?,
        status: BookingStatus::parse(&status),
        is_paid: row.get::<_, i32>(11)? != 0,
        notes: row.get(12)?,
        amenities: amenities.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_dt(&row.get::<_, String>(14)?),
        updated_at: parse_dt(&row.get::<_, String>(15)?),
        confirmed_at: confirmed_at.map(|s| parse_dt(&s)),
    })
}

// ── Stats ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    pub pending_bookings: i64,
    pub total_revenue: String,
}

/// Revenue sums total_price over confirmed bookings only; pending,
/// cancelled and completed stays are all excluded.
pub fn get_booking_stats(conn: &Connection) -> anyhow::Result<BookingStats> {
    let (total, confirmed, pending, revenue) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'confirmed'), 0),
                COALESCE(SUM(status = 'pending'), 0),
                COALESCE(SUM(CASE WHEN status = 'confirmed' THEN CAST(total_price AS REAL) END), 0.0)
         FROM bookings",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        },
    )?;

    Ok(BookingStats {
        total_bookings: total,
        confirmed_bookings: confirmed,
        pending_bookings: pending,
        total_revenue: format!("{revenue:.2}"),
    })
}

// ── Payments ──

pub fn insert_payment(conn: &Connection, payment: &Payment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO payments (id, booking_id, amount, currency, payment_method, transaction_id, status, processed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            payment.id,
            payment.booking_id,
            payment.amount,
            payment.currency,
            payment.payment_method.as_str(),
            payment.transaction_id,
            payment.status,
            payment.processed_at.map(fmt_dt),
            fmt_dt(payment.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_payment(conn: &Connection, id: &str) -> anyhow::Result<Option<Payment>> {
    let result = conn.query_row(
        "SELECT id, booking_id, amount, currency, payment_method, transaction_id, status, processed_at, created_at
         FROM payments WHERE id = ?1",
        params![id],
        |row| Ok(parse_payment_row(row)),
    );

    match result {
        Ok(payment) => Ok(Some(payment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn latest_payment_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Option<Payment>> {
    let result = conn.query_row(
        "SELECT id, booking_id, amount, currency, payment_method, transaction_id, status, processed_at, created_at
         FROM payments WHERE booking_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
        params![booking_id],
        |row| Ok(parse_payment_row(row)),
    );

    match result {
        Ok(payment) => Ok(Some(payment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Sets status and optional transaction id; completing a payment stamps
/// processed_at. Returns None when the id is unknown.
pub fn set_payment_status(
    conn: &Connection,
    id: &str,
    status: &str,
    transaction_id: Option<&str>,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Payment>> {
    let processed_at = (status == "completed").then(|| fmt_dt(now));

    let count = match transaction_id {
        Some(txn) => conn.execute(
            "UPDATE payments SET status = ?1, transaction_id = ?2, processed_at = COALESCE(?3, processed_at)
             WHERE id = ?4",
            params![status, txn, processed_at, id],
        )?,
        None => conn.execute(
            "UPDATE payments SET status = ?1, processed_at = COALESCE(?2, processed_at) WHERE id = ?3",
            params![status, processed_at, id],
        )?,
    };

    if count == 0 {
        return Ok(None);
    }
    get_payment(conn, id)
}

fn parse_payment_row(row: &rusqlite::Row) -> anyhow::Result<Payment> {
    let method: String = row.get(4)?;
    let processed_at: Option<String> = row.get(7)?;

    Ok(Payment {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        amount: row.get(2)?,
        currency: row.get(3)?,
        payment_method: PaymentMethod::parse(&method),
        transaction_id: row.get(5)?,
        status: row.get(6)?,
        processed_at: processed_at.map(|s| parse_dt(&s)),
        created_at: parse_dt(&row.get::<_, String>(8)?),
    })
}

// ── Reviews ──

pub fn insert_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, booking_id, guest_id, rating, title, comment, is_public, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            review.id,
            review.booking_id,
            review.guest_id,
            review.rating,
            review.title,
            review.comment,
            review.is_public as i32,
            fmt_dt(review.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_public_reviews(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, guest_id, rating, title, comment, is_public, created_at
         FROM reviews WHERE is_public = 1 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        let created_at: String = row.get(7)?;
        Ok(Review {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            guest_id: row.get(2)?,
            rating: row.get(3)?,
            title: row.get(4)?,
            comment: row.get(5)?,
            is_public: row.get::<_, i32>(6)? != 0,
            created_at: parse_dt(&created_at),
        })
    })?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row?);
    }
    Ok(reviews)
}
